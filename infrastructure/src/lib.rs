//! Infrastructure layer for kubex
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Ollama chat gateway, the Kubex REST API
//! operation handlers, configuration file loading and the JSONL
//! conversation log.

pub mod config;
pub mod kubex;
pub mod logging;
pub mod ollama;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigWarning, FileApiConfig, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileMemoryConfig, FileReplConfig, FileRoutingConfig,
};
pub use kubex::{HttpOperation, KubexClient, KubexClientError, NO_ACTIVE_CLUSTER, operation_table};
pub use logging::JsonlConversationLogger;
pub use ollama::{OllamaError, OllamaGateway};
