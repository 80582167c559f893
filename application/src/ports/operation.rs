//! Remote operation port
//!
//! Each domain agent owns an [`OperationTable`]: an explicit map from
//! operation name to the handler that performs it against the remote API.
//! A name without a handler is the "no implementation" branch, decided by
//! the caller.

use async_trait::async_trait;
use kubex_domain::ToolDefinition;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a remote operation.
///
/// The domain agent converts every one of these into an error result; they
/// never reach the conversation as errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Performs one remote operation
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Execute `tool` with its merged parameters, returning the JSON payload
    async fn call(
        &self,
        tool: &ToolDefinition,
        params: &Map<String, Value>,
    ) -> Result<Value, OperationError>;
}

/// Operation name → handler, populated when a domain agent is built
#[derive(Clone, Default)]
pub struct OperationTable {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an operation name (builder pattern)
    pub fn with(mut self, name: impl Into<String>, handler: Arc<dyn OperationHandler>) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn OperationHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("OperationTable").field("operations", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubex_domain::HttpMethod;
    use serde_json::json;

    struct Fixed(Value);

    #[async_trait]
    impl OperationHandler for Fixed {
        async fn call(
            &self,
            _tool: &ToolDefinition,
            _params: &Map<String, Value>,
        ) -> Result<Value, OperationError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_table_lookup() {
        let table = OperationTable::new().with("check_health", Arc::new(Fixed(json!({"status": "success"}))));
        assert!(table.contains("check_health"));
        assert!(table.get("list_clusters").is_none());

        let tool = ToolDefinition::new("check_health", "health", HttpMethod::Get, "/health");
        let handler = table.get("check_health").unwrap();
        let value = handler.call(&tool, &Map::new()).await.unwrap();
        assert_eq!(value["status"], "success");
    }

    #[test]
    fn test_error_display() {
        let err = OperationError::Http {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: not found");
        assert_eq!(OperationError::Transport("timeout".to_string()).to_string(), "timeout");
    }
}
