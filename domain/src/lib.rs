//! Domain layer for kubex
//!
//! This crate contains the core dialogue logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Decisions
//!
//! Every model call in a turn ends in a decision recovered from free text:
//!
//! - **Routing decision**: which domain agent (or plain chat) handles a message
//! - **Tool decision**: which operation of that agent to call, with which parameters
//!
//! A reply that cannot be understood degrades to a clarification question,
//! never to an error.
//!
//! ## Parameter collection
//!
//! An operation whose required parameters are incomplete pauses in a
//! [`ToolContext`] until the user supplies them. Contextual values such as
//! the active cluster are injected before anything is reported as missing.

pub mod agent;
pub mod catalog;
pub mod conversation;
pub mod core;
pub mod decision;
pub mod prompt;
pub mod routing;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use agent::{
    ActiveClusterBinding, AgentProfile, AgentState, CatalogBuilder, NEEDS_PARAMETERS,
    ParameterRequest, ToolContext, contextual_parameters,
};
pub use catalog::kubex_agents;
pub use conversation::{ConversationMemory, ConversationTurn};
pub use core::error::DomainError;
pub use decision::{
    AGENT_DISCRIMINATOR, CHAT_OPERATION, CLARIFICATION_RESPONSE, RoutingDecision,
    TOOL_DISCRIMINATOR, ToolDecision, try_parse_decision,
};
pub use prompt::{AgentPromptTemplate, PromptTemplate};
pub use routing::{FollowUpPolicy, KeywordFollowUp, NoFollowUp};
pub use session::{
    entities::{Message, Role},
    stream::StreamEvent,
};
pub use tool::{
    CLUSTER_ID_PARAMETER, HttpMethod, OperationResult, ParameterLocation, ToolDefinition,
    ToolParameter, ToolRegistry,
};
