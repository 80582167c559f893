//! Deployment catalog

use super::cluster_path;
use crate::tool::{HttpMethod, ParameterLocation, ToolDefinition, ToolParameter, ToolRegistry};

fn deployment_name(location: ParameterLocation, description: &str) -> ToolParameter {
    ToolParameter::new("deployment_name", description, true).at(location)
}

fn namespace(location: ParameterLocation) -> ToolParameter {
    ToolParameter::new(
        "namespace",
        "Name of the namespace the deployment lives in, e.g. 'default'.",
        true,
    )
    .at(location)
}

pub fn registry(cluster_id: Option<&str>) -> ToolRegistry {
    use ParameterLocation::{Body, Path, Query};

    ToolRegistry::new()
        .register(
            ToolDefinition::new(
                "list_deployments",
                "List the deployments of all namespaces with summary information.",
                HttpMethod::Get,
                cluster_path("/deployments/{cluster_id}/instant", cluster_id),
            )
            .with_description(
                "Returns every deployment of the cluster with its namespace, desired/ready replica \
                 counts (e.g. 3/3) and availability.",
            )
            .with_parameter(ToolParameter::cluster_id(Path)),
        )
        .register(
            ToolDefinition::new(
                "show_deployment",
                "Show the overall status of one deployment.",
                HttpMethod::Get,
                "/deployments/show",
            )
            .with_description("Summary status of a single deployment identified by name and namespace.")
            .with_parameter(ToolParameter::cluster_id(Query))
            .with_parameter(deployment_name(Query, "Full name of the deployment to inspect."))
            .with_parameter(namespace(Query)),
        )
        .register(
            ToolDefinition::new(
                "scale_deployment",
                "Change the replica count of a deployment.",
                HttpMethod::Post,
                "/deployments/scale",
            )
            .with_description(
                "Sets the number of pods (replicas) of a deployment, to handle more traffic or to save \
                 resources.",
            )
            .with_parameter(ToolParameter::cluster_id(Body))
            .with_parameter(deployment_name(Body, "Name of the deployment to scale."))
            .with_parameter(namespace(Body))
            .with_parameter(
                ToolParameter::new("replicas", "Target replica count, e.g. 3, 5, 10.", true)
                    .with_type("integer"),
            ),
        )
        .register(
            ToolDefinition::new(
                "redeploy_deployment",
                "Restart a deployment, replacing all of its running pods.",
                HttpMethod::Post,
                "/deployments/redeploy",
            )
            .with_description(
                "Triggers a rolling restart: existing pods are terminated one by one and replaced.",
            )
            .with_parameter(ToolParameter::cluster_id(Body))
            .with_parameter(deployment_name(Body, "Name of the deployment to restart."))
            .with_parameter(namespace(Body)),
        )
        .register(
            ToolDefinition::new(
                "get_deployment_config",
                "Fetch the full configuration of a deployment.",
                HttpMethod::Get,
                "/deployments/config",
            )
            .with_description(
                "Returns the complete resource definition: container image, environment variables, \
                 volumes, resource limits and other technical settings.",
            )
            .with_parameter(ToolParameter::cluster_id(Query))
            .with_parameter(deployment_name(Query, "Name of the deployment."))
            .with_parameter(namespace(Query)),
        )
        .register(
            ToolDefinition::new(
                "get_deployment_pods",
                "List every pod managed by a deployment.",
                HttpMethod::Get,
                "/deployments/{deployment_name}/pods",
            )
            .with_description(
                "Returns the pods that belong to the deployment and are running or trying to run.",
            )
            .with_parameter(ToolParameter::cluster_id(Query))
            .with_parameter(
                ToolParameter::new(
                    "namespace_name",
                    "Namespace of the deployment and its pods.",
                    true,
                )
                .at(Query),
            )
            .with_parameter(deployment_name(Path, "Name of the deployment whose pods are listed.")),
        )
        .register(
            ToolDefinition::new(
                "update_deployment_image",
                "Update the container image used by a deployment.",
                HttpMethod::Patch,
                "/deployments/image",
            )
            .with_description("Replaces the container image of the deployment's pods with a new version.")
            .with_parameter(ToolParameter::cluster_id(Body))
            .with_parameter(deployment_name(Body, "Name of the deployment to update."))
            .with_parameter(namespace(Body))
            .with_parameter(ToolParameter::new(
                "image",
                "Full name and tag of the new image, e.g. 'registry.example.com/team/app:v1.2'.",
                true,
            )),
        )
        .register_aliases([
            ("scale", "scale_deployment"),
            ("describe_deployment", "show_deployment"),
            ("get_deployment", "show_deployment"),
            ("restart_deployment", "redeploy_deployment"),
            ("rollout_restart", "redeploy_deployment"),
            ("list_pods", "get_deployment_pods"),
            ("get_pods", "get_deployment_pods"),
            ("set_image", "update_deployment_image"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_deployment_requires_three_values() {
        let registry = registry(None);
        let scale = registry.get_resolved("scale").unwrap();
        let visible: Vec<&str> = scale
            .visible_parameters()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(visible, vec!["deployment_name", "namespace", "replicas"]);
        assert!(scale.is_cluster_scoped());
    }

    #[test]
    fn test_pods_path_uses_deployment_placeholder() {
        let registry = registry(Some("c-9"));
        let pods = registry.get_tool("get_deployment_pods").unwrap();
        assert_eq!(pods.path, "/deployments/{deployment_name}/pods");
        assert_eq!(pods.parameter("deployment_name").unwrap().location, ParameterLocation::Path);
        assert_eq!(
            registry.get_tool("list_deployments").unwrap().path,
            "/deployments/c-9/instant"
        );
    }
}
