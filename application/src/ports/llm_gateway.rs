//! LLM Gateway port
//!
//! Defines the interface for communicating with the chat model.

use async_trait::async_trait;
use kubex_domain::StreamEvent;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// A single exchange with the model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub user_prompt: String,
    pub system_prompt: Option<String>,
    /// Whether prior exchanges kept by the gateway are sent as context
    pub use_history: bool,
}

impl ChatRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            system_prompt: None,
            use_history: false,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the chat model.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one exchange and wait for the full reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String, GatewayError>;

    /// Send one exchange and receive the reply incrementally.
    ///
    /// Default implementation calls `chat()` and wraps the result in a single
    /// `Completed` event.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<StreamHandle, GatewayError> {
        let result = self.chat(request).await?;
        let (tx, rx) = mpsc::channel(1);
        // Send Completed event; if the receiver is dropped, that's fine
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }

    /// Forget any model-side history the gateway keeps
    async fn clear_history(&self) {}
}

/// Handle for receiving streaming events from the model.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed, return what we have
        Ok(full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGateway;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn chat(&self, request: &ChatRequest) -> Result<String, GatewayError> {
            Ok(format!("echo: {}", request.user_prompt))
        }
    }

    #[tokio::test]
    async fn test_default_chat_stream_wraps_chat() {
        let handle = EchoGateway
            .chat_stream(&ChatRequest::new("hi"))
            .await
            .unwrap();
        assert_eq!(handle.collect_text().await.unwrap(), "echo: hi");
    }

    #[tokio::test]
    async fn test_collect_text_prefers_deltas() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("a".to_string())).await.unwrap();
        tx.send(StreamEvent::Delta("b".to_string())).await.unwrap();
        tx.send(StreamEvent::Completed("ab".to_string())).await.unwrap();
        assert_eq!(StreamHandle::new(rx).collect_text().await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_collect_text_surfaces_error() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(StreamEvent::Error("boom".to_string())).await.unwrap();
        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::RequestFailed("boom".to_string()));
    }

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("u").with_system_prompt("s").with_history(true);
        assert_eq!(request.system_prompt.as_deref(), Some("s"));
        assert!(request.use_history);
        assert!(!ChatRequest::new("u").use_history);
    }
}
