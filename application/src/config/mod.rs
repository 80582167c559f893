//! Application-level configuration.
//!
//! - [`EngineParams`]: memory limits and model-history policy of a session

pub mod engine_params;

pub use engine_params::{EngineParams, SYNC_TURNS};
