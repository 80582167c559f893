//! Prompt domain
//!
//! Templates for the three model calls of a turn: routing, tool selection
//! and result summarization.

pub mod agent;
mod template;

pub use agent::AgentPromptTemplate;
pub use template::PromptTemplate;
