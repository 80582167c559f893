//! Tool domain value objects: the outcome of executing an operation
//!
//! An [`OperationResult`] is what the summarizer sees. Remote failures are
//! values here, not errors: a raised transport error is folded into
//! [`OperationResult::Failure`] before it reaches the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Result of executing a remote operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationResult {
    /// Payload returned by the remote API (may itself report `status: error`)
    Success(Value),
    /// The call could not be completed; carries the error message
    Failure(String),
}

impl OperationResult {
    pub fn success(payload: Value) -> Self {
        OperationResult::Success(payload)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        OperationResult::Failure(message.into())
    }

    /// Error result for an operation that has no bound implementation
    pub fn not_implemented(operation: &str) -> Self {
        Self::failure(format!(
            "Operation '{}' has no implementation in this domain",
            operation
        ))
    }

    /// Whether the call completed and the payload does not report an error
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::Success(payload) => {
                payload.get("status").and_then(|s| s.as_str()) != Some("error")
            }
            OperationResult::Failure(_) => false,
        }
    }

    /// The structured form handed to the summarizer.
    ///
    /// Failures render as `{"error": "<message>"}`.
    pub fn to_value(&self) -> Value {
        match self {
            OperationResult::Success(payload) => payload.clone(),
            OperationResult::Failure(message) => json!({ "error": message }),
        }
    }
}
