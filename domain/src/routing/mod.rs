//! Router-level policies.

pub mod follow_up;

pub use follow_up::{DEFAULT_FOLLOW_UP_CUES, FollowUpPolicy, KeywordFollowUp, NoFollowUp};
