//! Domain agent profiles

use crate::tool::ToolRegistry;

/// Builds an agent's registry for the active cluster id (if any)
pub type CatalogBuilder = fn(Option<&str>) -> ToolRegistry;

/// Identity of a domain agent as the router sees it
#[derive(Clone)]
pub struct AgentProfile {
    /// Routing key the model answers with (e.g. "deployment")
    pub key: String,
    /// Domain label used in prompts and memory origins
    pub label: String,
    pub description: String,
    pub catalog: CatalogBuilder,
}

impl AgentProfile {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        catalog: CatalogBuilder,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            catalog,
        }
    }

    pub fn build_registry(&self, cluster_id: Option<&str>) -> ToolRegistry {
        (self.catalog)(cluster_id)
    }
}

impl std::fmt::Debug for AgentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentProfile")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
