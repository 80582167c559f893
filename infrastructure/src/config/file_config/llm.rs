//! LLM configuration from TOML (`[llm]` section)

use crate::ollama::gateway::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw LLM configuration from TOML
///
/// # Example
///
/// ```toml
/// [llm]
/// base_url = "http://localhost:11434"
/// model = "qwen3:4b"
/// temperature = 0.7
/// timeout_secs = 60
/// share_history = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Ollama server URL
    pub base_url: String,
    /// Model used for every call of the session
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Send the gateway's accumulated history with every call
    pub share_history: bool,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            share_history: false,
        }
    }
}

impl FileLlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
