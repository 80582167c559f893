//! Decisions recovered from model replies.
//!
//! - [`entities::ToolDecision`]: `{operation_name, parameters}` chosen inside a domain
//! - [`entities::RoutingDecision`]: `{agent, reasoning, response?}` chosen by the router
//! - [`extractor::try_parse_decision`]: tolerant JSON recovery shared by both

pub mod entities;
pub mod extractor;

pub use entities::{
    AGENT_DISCRIMINATOR, CHAT_OPERATION, CLARIFICATION_RESPONSE, ROUTING_UNAVAILABLE_RESPONSE,
    RoutingDecision, TOOL_DISCRIMINATOR, ToolDecision,
};
pub use extractor::try_parse_decision;
