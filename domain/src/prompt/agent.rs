//! Prompt templates for tool selection inside a domain agent

use crate::agent::ToolContext;
use crate::tool::{ToolDefinition, ToolRegistry};

/// Templates used by the tool-selection step
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt listing the domain's tools.
    ///
    /// Contextual parameters (`cluster_id`) are left out of the rendering.
    pub fn tool_selection_system(
        domain_label: &str,
        registry: &ToolRegistry,
        conversation_summary: &str,
    ) -> String {
        let tools_prompt = registry
            .get_tools()
            .iter()
            .map(Self::render_tool)
            .collect::<Vec<_>>()
            .join("\n");

        let context_info = if conversation_summary.is_empty() {
            String::new()
        } else {
            format!("\n### RECENT CONVERSATION ###\n{}\n", conversation_summary)
        };

        format!(
            r#"### IDENTITY ###
You are a KUBEX assistant specialized in **{domain_label}**.
Analyze the user's request and use your tool set as effectively as possible.

### TOOL SET: {domain_label} ###
{tools_prompt}
{context_info}
### WORKFLOW AND RULES ###
1. **Analyze** the user's request.
2. **Tools first:** If the request matches a tool in the TOOL SET, you **MUST** use that tool.
3. **Chat exception:** Use the 'chat' tool **ONLY** when no tool matches or the user is just chatting.
4. **Missing values:** Put every value you can find in the request into `parameters`. Never choose 'chat' because required values are missing; they will be asked for separately.

### OUTPUT FORMAT ###
Return **ONLY** a JSON object in this format. Do not add any other text.

```json
{{
  "tool_name": "tool_to_use | chat",
  "parameters": {{}}
}}
```
For 'chat', put your reply in `parameters.response`.

### STRICT RULE ###
If the request asks for an action that a tool in the set can perform, using 'chat' is **FORBIDDEN**."#
        )
    }

    fn render_tool(tool: &ToolDefinition) -> String {
        let params = tool
            .visible_parameters()
            .map(|p| {
                if p.required {
                    format!("{} ({}, {})", p.name, p.location, p.param_type)
                } else {
                    format!("{} ({}, {}, optional)", p.name, p.location, p.param_type)
                }
            })
            .collect::<Vec<_>>();
        let params_str = if params.is_empty() {
            "None".to_string()
        } else {
            params.join(", ")
        };

        format!(
            "  - Tool: '{}'\n  - Description: {}\n  - Parameters: {}",
            tool.name, tool.summary, params_str
        )
    }

    /// Reminder of a pending operation, prepended to the user's message
    pub fn context_reminder(ctx: &ToolContext) -> String {
        format!(
            "CONTEXT: You previously selected the '{}' tool for the request \"{}\". \
             Missing parameters: {}. The user's new message is most likely supplying these values; \
             keep the same tool and include the values already known: {}.",
            ctx.operation_name,
            ctx.originating_request,
            ctx.missing_parameter_names.join(", "),
            serde_json::Value::Object(ctx.extracted_parameters.clone())
        )
    }

    /// User prompt, with an optional pending-operation reminder in front
    pub fn tool_selection_user(text: &str, context_reminder: Option<&str>) -> String {
        match context_reminder {
            Some(reminder) => format!("{}\n\nUser message: {}", reminder, text),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{HttpMethod, ParameterLocation, ToolParameter};
    use serde_json::{Map, json};

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(ToolDefinition::new(
                "list_deployments",
                "List deployments",
                HttpMethod::Get,
                "/deployments/{cluster_id}/instant",
            )
            .with_parameter(ToolParameter::cluster_id(ParameterLocation::Path)))
            .register(
                ToolDefinition::new("show_deployment", "Show one deployment", HttpMethod::Get, "/deployments/show")
                    .with_parameter(ToolParameter::cluster_id(ParameterLocation::Query))
                    .with_parameter(
                        ToolParameter::new("deployment_name", "Deployment", true)
                            .at(ParameterLocation::Query),
                    )
                    .with_parameter(
                        ToolParameter::new("verbose", "Verbose", false).with_type("boolean"),
                    ),
            )
    }

    #[test]
    fn test_tool_selection_system_hides_cluster_id() {
        let prompt = AgentPromptTemplate::tool_selection_system("Kubernetes Deployment", &registry(), "");
        assert!(prompt.contains("TOOL SET: Kubernetes Deployment"));
        assert!(prompt.contains("  - Tool: 'list_deployments'\n  - Description: List deployments\n  - Parameters: None"));
        assert!(prompt.contains("deployment_name (query, string), verbose (body, boolean, optional)"));
        assert!(!prompt.contains("cluster_id"));
        assert!(!prompt.contains("RECENT CONVERSATION"));
    }

    #[test]
    fn test_context_reminder_names_pending_operation() {
        let mut extracted = Map::new();
        extracted.insert("deployment_name".to_string(), json!("nginx"));
        let ctx = ToolContext::new(
            "scale_deployment",
            vec!["namespace".to_string(), "replicas".to_string()],
            extracted,
            "scale nginx",
        );

        let reminder = AgentPromptTemplate::context_reminder(&ctx);
        assert!(reminder.contains("'scale_deployment'"));
        assert!(reminder.contains("\"scale nginx\""));
        assert!(reminder.contains("Missing parameters: namespace, replicas."));
        assert!(reminder.contains(r#"{"deployment_name":"nginx"}"#));

        let user = AgentPromptTemplate::tool_selection_user("in default, 3 replicas", Some(&reminder));
        assert!(user.ends_with("User message: in default, 3 replicas"));
    }

    #[test]
    fn test_tool_selection_user_without_reminder() {
        assert_eq!(AgentPromptTemplate::tool_selection_user("hi", None), "hi");
    }
}
