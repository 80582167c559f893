//! Helm repository catalog

use super::cluster_path;
use crate::tool::{HttpMethod, ParameterLocation, ToolDefinition, ToolParameter, ToolRegistry};

pub fn registry(cluster_id: Option<&str>) -> ToolRegistry {
    let path = |suffix: &str| cluster_path(&format!("/repositories/{{cluster_id}}{suffix}"), cluster_id);

    ToolRegistry::new()
        .register(
            ToolDefinition::new(
                "list_repositories",
                "List every Helm repository added to the cluster.",
                HttpMethod::Get,
                path("/list"),
            )
            .with_description(
                "Returns the repositories previously added with add_repository, with their short name \
                 and source URL.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "add_repository",
                "Add a new Helm chart repository to the cluster.",
                HttpMethod::Post,
                path("/add"),
            )
            .with_description(
                "Registers the Helm repository at the given URL under a short name, making its charts \
                 installable.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path))
            .with_parameter(ToolParameter::new(
                "name",
                "Unique short name for the repository, e.g. 'prometheus-community', 'bitnami'.",
                true,
            ))
            .with_parameter(ToolParameter::new(
                "url",
                "URL hosting the repository, e.g. 'https://prometheus-community.github.io/helm-charts'.",
                true,
            )),
        )
        .register(
            ToolDefinition::new(
                "delete_repository",
                "Remove a Helm repository from the cluster by name.",
                HttpMethod::Delete,
                path("/{repository_name}"),
            )
            .with_description("After removal the charts of that repository can no longer be installed.")
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path))
            .with_parameter(
                ToolParameter::new(
                    "repository_name",
                    "Short name the repository was added with.",
                    true,
                )
                .at(ParameterLocation::Path),
            ),
        )
        .register(
            ToolDefinition::new(
                "update_repositories",
                "Refresh the chart lists of all Helm repositories.",
                HttpMethod::Post,
                path("/update"),
            )
            .with_description(
                "Equivalent to `helm repo update`: fetches the latest chart and version information.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)),
        )
        .register(
            ToolDefinition::new(
                "install_chart",
                "Install a Helm chart into the cluster as an application.",
                HttpMethod::Post,
                path("/install"),
            )
            .with_description(
                "Deploys an application from a Helm chart, creating a release, e.g. install \
                 'prometheus-community/kube-prometheus-stack' as 'monitoring'.",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path))
            .with_parameter(ToolParameter::new(
                "chart",
                "Full chart name in 'repository/chart' form, e.g. 'bitnami/redis'.",
                true,
            ))
            .with_parameter(ToolParameter::new(
                "name",
                "Unique release name, e.g. 'monitoring-stack'.",
                true,
            ))
            .with_parameter(ToolParameter::new(
                "namespace",
                "Namespace in which the release's resources are created.",
                true,
            ))
            .with_parameter(
                ToolParameter::new(
                    "values",
                    "JSON object overriding chart defaults, e.g. {\"replicaCount\": 3}.",
                    false,
                )
                .with_type("object"),
            ),
        )
        .register(
            ToolDefinition::new(
                "check_health",
                "Check the health of the service that runs Helm operations.",
                HttpMethod::Get,
                "/repositories/health",
            )
            .with_description("Useful as a first check when other Helm tools fail."),
        )
        .register_aliases([
            ("add_repo", "add_repository"),
            ("list_repos", "list_repositories"),
            ("remove_repository", "delete_repository"),
            ("update_repository", "update_repositories"),
            ("repo_update", "update_repositories"),
            ("install", "install_chart"),
            ("health", "check_health"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn test_repository_paths() {
        let registry = registry(Some("c-3"));
        assert_eq!(registry.get_tool("list_repositories").unwrap().path, "/repositories/c-3/list");

        let delete = registry.get_resolved("remove_repository").unwrap();
        let mut params = Map::new();
        params.insert("repository_name".to_string(), json!("bitnami"));
        assert_eq!(delete.render_path(&params).unwrap(), "/repositories/c-3/bitnami");
    }

    #[test]
    fn test_install_chart_values_optional() {
        let registry = registry(None);
        let install = registry.get_tool("install_chart").unwrap();
        let values = install.parameter("values").unwrap();
        assert!(!values.required);
        assert_eq!(values.param_type, "object");
        assert_eq!(install.path, "/repositories/{cluster_id}/install");
    }
}
