//! Conversation memory configuration from TOML (`[memory]` section)

use kubex_application::EngineParams;
use serde::{Deserialize, Serialize};

/// Raw memory limits from TOML
///
/// # Example
///
/// ```toml
/// [memory]
/// global_capacity = 10   # turns kept by the router
/// agent_capacity = 5     # turns kept by each domain agent
/// summary_turns = 3      # turns rendered into prompts
/// sync_turns = 3         # turns copied into an agent when it is selected
/// summary_chars = 80     # characters kept per summarized message
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub global_capacity: usize,
    pub agent_capacity: usize,
    pub summary_turns: usize,
    pub sync_turns: usize,
    pub summary_chars: usize,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            global_capacity: params.global_capacity,
            agent_capacity: params.agent_capacity,
            summary_turns: params.summary_turns,
            sync_turns: params.sync_turns,
            summary_chars: params.summary_chars,
        }
    }
}

impl FileMemoryConfig {
    /// Fields that must be positive for memory to hold anything
    pub(super) fn zero_fields(&self) -> Vec<&'static str> {
        [
            ("global_capacity", self.global_capacity),
            ("agent_capacity", self.agent_capacity),
            ("summary_turns", self.summary_turns),
            ("summary_chars", self.summary_chars),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| name)
        .collect()
    }
}
