//! Cluster catalog

use super::cluster_path;
use crate::tool::{HttpMethod, ParameterLocation, ToolDefinition, ToolParameter, ToolRegistry};

pub fn registry(cluster_id: Option<&str>) -> ToolRegistry {
    ToolRegistry::new()
        .register(
            ToolDefinition::new(
                "list_clusters",
                "List every Kubernetes cluster registered in the system.",
                HttpMethod::Get,
                "/clusters",
            )
            .with_description(
                "Returns all clusters the user can access, with basic information such as name and id. \
                 Use it for requests like 'which clusters are there?' or 'show the clusters'.",
            ),
        )
        .register(
            ToolDefinition::new(
                "create_cluster",
                "Register a new Kubernetes cluster in the system.",
                HttpMethod::Post,
                "/clusters",
            )
            .with_description(
                "Creates a record for a cluster to be managed. It does not provision a cluster, it only \
                 adds a definition so an existing cluster can be managed.",
            )
            .with_parameter(ToolParameter::new(
                "name",
                "Unique, descriptive name for the cluster record, e.g. 'production-cluster'.",
                true,
            )),
        )
        .register(
            ToolDefinition::new(
                "get_cluster_details",
                "Show the configuration and identity details of the active cluster.",
                HttpMethod::Get,
                cluster_path("/clusters/{cluster_id}", cluster_id),
            )
            .with_description(
                "Static registration data of the active cluster: name, id, creation date. \
                 For live resource counts use get_cluster_summary.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "get_cluster_summary",
                "Live resource summary of the active cluster (nodes, pods, deployments).",
                HttpMethod::Get,
                cluster_path("/clusters/summary/{cluster_id}", cluster_id),
            )
            .with_description(
                "Connects to the active cluster and summarizes node, running/pending pod, deployment \
                 and service counts. Use it to judge overall health and load.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "update_cluster",
                "Update the connection data (kubeconfig) of the active cluster.",
                HttpMethod::Patch,
                cluster_path("/clusters/{cluster_id}", cluster_id),
            )
            .with_description(
                "Adds or replaces the kubeconfig files used to reach the active cluster, e.g. when the \
                 connection fails or the credentials changed.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path))
            .with_parameter(
                ToolParameter::new(
                    "kubeconfigs",
                    "A list with the contents of the kubeconfig files to add to the cluster.",
                    true,
                )
                .with_type("array"),
            ),
        )
        .register_aliases([
            ("list_cluster", "list_clusters"),
            ("clusters", "list_clusters"),
            ("add_cluster", "create_cluster"),
            ("register_cluster", "create_cluster"),
            ("cluster_details", "get_cluster_details"),
            ("cluster_summary", "get_cluster_summary"),
        ])
}
