//! Engine parameters: memory limits and history policy.
//!
//! [`EngineParams`] groups the static parameters that shape a conversation
//! session: how much each memory keeps, how much of it is rendered into
//! prompts, and whether model calls reuse the gateway's history.

use kubex_domain::conversation::{
    AGENT_MEMORY_CAPACITY, GLOBAL_MEMORY_CAPACITY, SUMMARY_MESSAGE_CHARS, SUMMARY_TURNS,
};
use serde::{Deserialize, Serialize};

/// Turns copied from global memory into an agent when it is (re)selected
pub const SYNC_TURNS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Capacity of the router's memory.
    pub global_capacity: usize,
    /// Capacity of each domain agent's memory.
    pub agent_capacity: usize,
    /// Turns rendered into a prompt summary.
    pub summary_turns: usize,
    /// Turns synced into an agent on selection.
    pub sync_turns: usize,
    /// Characters kept per message in a summary.
    pub summary_chars: usize,
    /// Whether model calls include the gateway's accumulated history.
    ///
    /// Applies to every call of the session alike; prompts always embed
    /// their own summary, so an empty history is harmless.
    pub share_history: bool,
    /// Whether follow-up questions stick to the current agent.
    pub sticky_follow_ups: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            global_capacity: GLOBAL_MEMORY_CAPACITY,
            agent_capacity: AGENT_MEMORY_CAPACITY,
            summary_turns: SUMMARY_TURNS,
            sync_turns: SYNC_TURNS,
            summary_chars: SUMMARY_MESSAGE_CHARS,
            share_history: false,
            sticky_follow_ups: true,
        }
    }
}

impl EngineParams {
    // ==================== Builder Methods ====================

    pub fn with_global_capacity(mut self, capacity: usize) -> Self {
        self.global_capacity = capacity;
        self
    }

    pub fn with_agent_capacity(mut self, capacity: usize) -> Self {
        self.agent_capacity = capacity;
        self
    }

    pub fn with_summary(mut self, turns: usize, chars: usize) -> Self {
        self.summary_turns = turns;
        self.summary_chars = chars;
        self
    }

    pub fn with_sync_turns(mut self, turns: usize) -> Self {
        self.sync_turns = turns;
        self
    }

    pub fn with_shared_history(mut self, share: bool) -> Self {
        self.share_history = share;
        self
    }

    pub fn with_sticky_follow_ups(mut self, sticky: bool) -> Self {
        self.sticky_follow_ups = sticky;
        self
    }
}
