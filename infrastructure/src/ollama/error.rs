//! Error types for the Ollama adapter

use kubex_application::GatewayError;
use thiserror::Error;

/// Result type alias for Ollama operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Errors that can occur when talking to an Ollama server
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ollama error: {0}")]
    Api(String),

    #[error("Response contained no message")]
    EmptyResponse,
}

impl From<OllamaError> for GatewayError {
    fn from(error: OllamaError) -> Self {
        match error {
            OllamaError::Client(e) if e.is_timeout() => GatewayError::Timeout,
            OllamaError::Client(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            OllamaError::Client(e) => GatewayError::RequestFailed(e.to_string()),
            OllamaError::Status { status: 404, body } => GatewayError::ModelNotAvailable(body),
            e @ OllamaError::Status { .. } => GatewayError::RequestFailed(e.to_string()),
            OllamaError::Api(message) => GatewayError::RequestFailed(message),
            e @ (OllamaError::Serialization(_) | OllamaError::EmptyResponse) => {
                GatewayError::InvalidResponse(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_maps_to_model_not_available() {
        let error = OllamaError::Status {
            status: 404,
            body: "model 'qwen3:4b' not found".to_string(),
        };
        assert_eq!(
            GatewayError::from(error),
            GatewayError::ModelNotAvailable("model 'qwen3:4b' not found".to_string())
        );
    }

    #[test]
    fn test_server_error_keeps_status_in_message() {
        let error = OllamaError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            GatewayError::from(error),
            GatewayError::RequestFailed("Ollama returned HTTP 500: boom".to_string())
        );
    }

    #[test]
    fn test_empty_response_is_invalid() {
        assert!(matches!(
            GatewayError::from(OllamaError::EmptyResponse),
            GatewayError::InvalidResponse(_)
        ));
    }
}
