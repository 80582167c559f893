//! Ollama adapter
//!
//! Implements [`LlmGateway`](kubex_application::LlmGateway) against a local
//! or remote Ollama server using its `/api/chat` endpoint, both as a single
//! blocking exchange and as an NDJSON stream.

pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::OllamaError;
pub use gateway::OllamaGateway;
