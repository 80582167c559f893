//! Bounded conversation log

use crate::util::ellipsize;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity of the router-level memory
pub const GLOBAL_MEMORY_CAPACITY: usize = 10;
/// Default capacity of a domain agent's local memory
pub const AGENT_MEMORY_CAPACITY: usize = 5;
/// Turns rendered into a prompt summary
pub const SUMMARY_TURNS: usize = 3;
/// Characters kept per message in a prompt summary
pub const SUMMARY_MESSAGE_CHARS: usize = 80;

/// Summary text used when nothing has been said yet
pub const EMPTY_HISTORY: &str = "No conversation history yet.";

/// One completed exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_message: String,
    pub assistant_message: String,
    /// Who answered: "Chat", "Error", "Router" or a domain label
    pub origin: String,
    /// Monotonic sequence number within the owning memory
    pub timestamp_marker: u64,
}

/// Append-only log of recent turns with FIFO eviction.
///
/// Only completed turns are appended; a partially consumed reply never
/// reaches memory.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
    next_marker: u64,
}

impl ConversationMemory {
    /// Create a memory holding at most `capacity` turns (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
            next_marker: 0,
        }
    }

    pub fn global() -> Self {
        Self::new(GLOBAL_MEMORY_CAPACITY)
    }

    pub fn for_agent() -> Self {
        Self::new(AGENT_MEMORY_CAPACITY)
    }

    pub fn append(
        &mut self,
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
        origin: impl Into<String>,
    ) {
        self.next_marker += 1;
        self.turns.push_back(ConversationTurn {
            user_message: user_message.into(),
            assistant_message: assistant_message.into(),
            origin: origin.into(),
            timestamp_marker: self.next_marker,
        });
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// The most recent `n` turns, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter().skip(self.turns.len().saturating_sub(n))
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Compact rendering of the last `n` turns for a prompt.
    ///
    /// ```text
    /// 1. [Kubernetes Deployment] User: scale nginx
    ///    Assistant: nginx now runs 3 replicas
    /// ```
    pub fn summary(&self, n: usize, max_chars: usize) -> String {
        if self.turns.is_empty() {
            return EMPTY_HISTORY.to_string();
        }

        self.recent(n)
            .enumerate()
            .map(|(i, turn)| {
                format!(
                    "{}. [{}] User: {}\n   Assistant: {}",
                    i + 1,
                    turn.origin,
                    ellipsize(&turn.user_message, max_chars),
                    ellipsize(&turn.assistant_message, max_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::global()
    }
}
