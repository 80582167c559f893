//! Domain agent module
//!
//! Contains the dialogue state of a domain agent, the pending-parameter
//! [`ToolContext`], and the parameter injection/detection/question logic
//! that runs between a decision and an execution.

pub mod entities;
pub mod parameters;
pub mod profile;

pub use entities::{AgentState, ToolContext};
pub use parameters::{
    ActiveClusterBinding, NEEDS_PARAMETERS, ParameterRequest, coerce_answer, contextual_parameters,
    inject_contextual, is_blank, missing_parameters, question_for, questions_for,
};
pub use profile::{AgentProfile, CatalogBuilder};
