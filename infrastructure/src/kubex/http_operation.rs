//! Generic HTTP execution of catalog tools

use crate::kubex::client::KubexClient;
use crate::kubex::post_process::{self, PostProcessor};
use async_trait::async_trait;
use kubex_application::{OperationError, OperationHandler, OperationTable};
use kubex_domain::agent::is_blank;
use kubex_domain::{CLUSTER_ID_PARAMETER, HttpMethod, ParameterLocation, ToolDefinition, ToolRegistry};
use reqwest::Method;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Error text when a cluster-scoped tool runs without a bound cluster
pub const NO_ACTIVE_CLUSTER: &str =
    "No active cluster selected. Choose a cluster first, then repeat the request.";

/// Executes any [`ToolDefinition`] against the Kubex API
pub struct HttpOperation {
    client: KubexClient,
    post_process: Option<PostProcessor>,
}

impl HttpOperation {
    pub fn new(client: KubexClient) -> Self {
        Self {
            client,
            post_process: None,
        }
    }

    pub fn with_post_processor(mut self, post_process: PostProcessor) -> Self {
        self.post_process = Some(post_process);
        self
    }

    /// Build the request for a tool: path placeholders, query string and
    /// JSON body are taken from the parameters declared at each location.
    pub fn build_request(
        &self,
        tool: &ToolDefinition,
        params: &Map<String, Value>,
    ) -> Result<reqwest::RequestBuilder, OperationError> {
        if tool.is_cluster_scoped() && is_blank(params.get(CLUSTER_ID_PARAMETER)) {
            return Err(OperationError::InvalidParameters(NO_ACTIVE_CLUSTER.to_string()));
        }

        let path = tool
            .render_path(params)
            .map_err(|e| OperationError::InvalidParameters(e.to_string()))?;

        let query: Vec<(String, String)> = declared_values(tool, params, ParameterLocation::Query)
            .map(|(name, value)| (name.to_string(), query_value(value)))
            .collect();

        let mut request = self.client.request(method(tool.method), &path);
        if !query.is_empty() {
            request = request.query(&query);
        }

        if tool.method.carries_body() {
            let body: Map<String, Value> = declared_values(tool, params, ParameterLocation::Body)
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            if !body.is_empty() {
                request = request.json(&body);
            }
        }

        Ok(request)
    }

    fn shape(&self, tool: &ToolDefinition, params: &Map<String, Value>, data: Value) -> Value {
        if let Some(post_process) = self.post_process {
            return post_process(params, data);
        }

        // Pass through a payload that already reports its own status
        if data.get("status").and_then(Value::as_str).is_some() {
            return data;
        }

        let echoed: Map<String, Value> = tool
            .parameters
            .iter()
            .filter_map(|p| params.get(&p.name).map(|v| (p.name.clone(), v.clone())))
            .collect();
        json!({
            "status": "success",
            "operation": tool.name,
            "parameters": echoed,
            "data": data,
            "message": format!("'{}' completed successfully.", tool.name),
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Declared, non-null values at one location, in declaration order
fn declared_values<'a>(
    tool: &'a ToolDefinition,
    params: &'a Map<String, Value>,
    location: ParameterLocation,
) -> impl Iterator<Item = (&'a str, &'a Value)> {
    tool.parameters
        .iter()
        .filter(move |p| p.location == location)
        .filter_map(|p| match params.get(&p.name) {
            None | Some(Value::Null) => None,
            Some(value) => Some((p.name.as_str(), value)),
        })
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl OperationHandler for HttpOperation {
    async fn call(
        &self,
        tool: &ToolDefinition,
        params: &Map<String, Value>,
    ) -> Result<Value, OperationError> {
        let request = self.build_request(tool, params)?;
        info!(operation = %tool.name, method = %tool.method, "Calling Kubex API");

        let response = request
            .send()
            .await
            .map_err(|e| OperationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OperationError::Transport(e.to_string()))?;

        if !status.is_success() {
            debug!(operation = %tool.name, status = status.as_u16(), "Kubex API error");
            return Err(OperationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(self.shape(tool, params, data))
    }
}

/// One [`HttpOperation`] per tool of `registry`, sharing `client`
pub fn operation_table(registry: &ToolRegistry, client: &KubexClient) -> OperationTable {
    registry
        .get_tools()
        .iter()
        .fold(OperationTable::new(), |table, tool| {
            let mut operation = HttpOperation::new(client.clone());
            if let Some(post_process) = post_process::for_operation(&tool.name) {
                operation = operation.with_post_processor(post_process);
            }
            table.with(tool.name.clone(), Arc::new(operation))
        })
}
