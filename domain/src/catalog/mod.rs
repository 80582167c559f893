//! Built-in KUBEX tool catalogs.
//!
//! One catalog per domain agent. Each builder takes the active cluster id:
//! when it is known the id is baked into path templates, otherwise the
//! `{cluster_id}` placeholder stays and is rendered from the injected
//! parameter at execution time.

pub mod cluster;
pub mod deployment;
pub mod namespace;
pub mod repository;

use crate::agent::AgentProfile;

pub const CLUSTER_AGENT: &str = "cluster";
pub const NAMESPACE_AGENT: &str = "namespace";
pub const DEPLOYMENT_AGENT: &str = "deployment";
pub const REPOSITORY_AGENT: &str = "repository";

/// The four KUBEX domain agents, in routing order
pub fn kubex_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            CLUSTER_AGENT,
            "Kubernetes Cluster",
            "Manages, lists, registers and updates Kubernetes clusters.",
            cluster::registry,
        ),
        AgentProfile::new(
            NAMESPACE_AGENT,
            "Kubernetes Namespace",
            "Lists namespaces, summarizes their pods and shows namespace details.",
            namespace::registry,
        ),
        AgentProfile::new(
            DEPLOYMENT_AGENT,
            "Kubernetes Deployment",
            "Lists, inspects, scales, restarts and re-images deployments and their pods.",
            deployment::registry,
        ),
        AgentProfile::new(
            REPOSITORY_AGENT,
            "Helm Repository",
            "Manages Helm repositories and installs charts.",
            repository::registry,
        ),
    ]
}

/// Substitute `{cluster_id}` in a path template when the id is known
pub(crate) fn cluster_path(template: &str, cluster_id: Option<&str>) -> String {
    match cluster_id {
        Some(id) if !id.trim().is_empty() => template.replace("{cluster_id}", id),
        _ => template.to_string(),
    }
}
