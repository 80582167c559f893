//! Namespace catalog

use super::cluster_path;
use crate::tool::{HttpMethod, ParameterLocation, ToolDefinition, ToolParameter, ToolRegistry};

pub fn registry(cluster_id: Option<&str>) -> ToolRegistry {
    ToolRegistry::new()
        .register(
            ToolDefinition::new(
                "list_namespaces",
                "List the names of all namespaces in the active cluster.",
                HttpMethod::Get,
                cluster_path("/namespaces/{cluster_id}/instant", cluster_id),
            )
            .with_description(
                "Returns only the namespace names of the active cluster. Use it for 'which namespaces \
                 are there?' or 'list the namespaces'.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "get_namespace_summary",
                "Pod and resource usage summary for every namespace.",
                HttpMethod::Get,
                cluster_path("/namespaces/summary/{cluster_id}", cluster_id),
            )
            .with_description(
                "Reports running, pending and failed pod counts per namespace. Use it to review cluster \
                 health quickly or to find the namespace with problems.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "show_namespace",
                "Show the configuration and status details of one namespace.",
                HttpMethod::Get,
                "/namespaces/show",
            )
            .with_description(
                "Returns the phase, labels, annotations and creation timestamp of a single namespace.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Query))
            .with_parameter(
                ToolParameter::new(
                    "namespace_name",
                    "Full name of the namespace, e.g. 'default', 'production', 'kube-public'.",
                    true,
                )
                .at(ParameterLocation::Query),
            ),
        )
        .register_aliases([
            ("namespaces", "list_namespaces"),
            ("list_namespace", "list_namespaces"),
            ("namespace_summary", "get_namespace_summary"),
            ("describe_namespace", "show_namespace"),
            ("get_namespace", "show_namespace"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_catalog() {
        let registry = registry(None);
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get_tool("list_namespaces").unwrap().path,
            "/namespaces/{cluster_id}/instant"
        );
        let show = registry.get_resolved("describe_namespace").unwrap();
        assert_eq!(show.name, "show_namespace");
        assert_eq!(show.parameter("namespace_name").unwrap().location, ParameterLocation::Query);
    }
}
