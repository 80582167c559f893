//! Routing configuration from TOML (`[routing]` section)

use kubex_domain::routing::DEFAULT_FOLLOW_UP_CUES;
use kubex_domain::{FollowUpPolicy, KeywordFollowUp, NoFollowUp};
use serde::{Deserialize, Serialize};

/// Raw routing configuration from TOML
///
/// # Example
///
/// ```toml
/// [routing]
/// sticky_follow_ups = true
/// follow_up_cues = ["this", "that", "why", "how many"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// Phrases marking a message as a follow-up to the previous answer
    pub follow_up_cues: Vec<String>,
    /// Keep follow-ups with the agent that produced the previous answer
    pub sticky_follow_ups: bool,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        Self {
            follow_up_cues: DEFAULT_FOLLOW_UP_CUES.iter().map(|c| c.to_string()).collect(),
            sticky_follow_ups: true,
        }
    }
}

impl FileRoutingConfig {
    /// Follow-up policy for the router; every message re-routes when
    /// stickiness is off.
    pub fn follow_up_policy(&self) -> Box<dyn FollowUpPolicy> {
        if self.sticky_follow_ups {
            Box::new(KeywordFollowUp::new(&self.follow_up_cues))
        } else {
            Box::new(NoFollowUp)
        }
    }
}
