//! Tool domain module
//!
//! This module defines how a domain agent describes the remote operations it
//! can call: every operation is a [`ToolDefinition`] (name, summary, HTTP
//! method, path template, ordered [`ToolParameter`]s) held in a
//! per-agent [`ToolRegistry`], and every execution ends in an
//! [`OperationResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ ToolRegistry │───▶│ ToolDecision │───▶│ OperationResult │
//! │ (per agent)  │    │ (from model) │    │ (to summarizer) │
//! └──────┬───────┘    └──────────────┘    └─────────────────┘
//!        │
//!        ├─ aliases: "scale" → "scale_deployment"
//!        └─ tools:   "scale_deployment" → ToolDefinition
//! ```
//!
//! # Reserved parameter
//!
//! [`CLUSTER_ID_PARAMETER`] is never shown to the model or the user. It is
//! filled from the active cluster binding just before the missing-parameter
//! check (see [`crate::agent::parameters`]).

pub mod entities;
pub mod value_objects;

pub use entities::{
    CLUSTER_ID_PARAMETER, HttpMethod, ParameterLocation, ToolDefinition, ToolParameter,
    ToolRegistry,
};
pub use value_objects::OperationResult;
