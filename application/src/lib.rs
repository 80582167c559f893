//! Application layer for kubex
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::EngineParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{ChatRequest, GatewayError, LlmGateway, StreamHandle},
    operation::{OperationError, OperationHandler, OperationTable},
};
pub use use_cases::domain_agent::DomainAgent;
pub use use_cases::reply::{FailureKind, ReplyStream, TurnReply};
pub use use_cases::router::{Router, RouterStatus};
pub use use_cases::select_agent::AgentSelectionService;
pub use use_cases::select_tool::{ToolSelectionInput, ToolSelectionService};
pub use use_cases::summarize_result::SummarizationService;
