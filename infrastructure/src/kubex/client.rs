//! Shared HTTP client for the Kubex API

use reqwest::Method;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum KubexClientError {
    #[error("Invalid Kubex API URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct KubexClient {
    http: reqwest::Client,
    base: Url,
}

impl KubexClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, KubexClientError> {
        let base_url = base_url.into();
        let invalid = |reason: String| KubexClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason,
        };

        let base = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(base_url = %base, "Kubex API client created");
        Ok(Self { http, base })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Absolute URL of an API path (`path` starts with `/`).
    ///
    /// Each segment is percent-encoded on its own, so no segment can
    /// introduce a query string or a fragment.
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        url
    }

    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http.request(method, self.url(path))
    }
}
