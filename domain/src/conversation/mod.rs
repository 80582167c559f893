//! Conversation memory shared by the router and mirrored per domain agent.

pub mod memory;

pub use memory::{
    AGENT_MEMORY_CAPACITY, ConversationMemory, ConversationTurn, EMPTY_HISTORY,
    GLOBAL_MEMORY_CAPACITY, SUMMARY_MESSAGE_CHARS, SUMMARY_TURNS,
};
