//! Kubex REST API adapter
//!
//! Every catalog tool is executed by one generic [`HttpOperation`]: the
//! [`ToolDefinition`](kubex_domain::ToolDefinition) says where each
//! parameter goes, so no per-tool client code is needed. A few list
//! operations get their raw payload reshaped by a post-processor.

pub mod client;
pub mod http_operation;
pub mod post_process;

pub use client::{DEFAULT_API_TIMEOUT, DEFAULT_API_URL, KubexClient, KubexClientError};
pub use http_operation::{HttpOperation, NO_ACTIVE_CLUSTER, operation_table};
