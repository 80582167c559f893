//! Tool-selection service.
//!
//! One self-contained model exchange per call: the prompt embeds the
//! domain's tools, a compact conversation summary and, while parameters are
//! pending, a reminder of the paused operation. Transport failures are not
//! retried; like unparseable replies they degrade to the clarification
//! decision.

use crate::ports::llm_gateway::{ChatRequest, LlmGateway};
use kubex_domain::{
    AgentPromptTemplate, TOOL_DISCRIMINATOR, ToolContext, ToolDecision, ToolRegistry,
    try_parse_decision,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Input for one tool selection
pub struct ToolSelectionInput<'a> {
    pub user_text: &'a str,
    pub domain_label: &'a str,
    pub registry: &'a ToolRegistry,
    pub conversation_summary: &'a str,
    pub tool_context: Option<&'a ToolContext>,
}

#[derive(Clone)]
pub struct ToolSelectionService {
    gateway: Arc<dyn LlmGateway>,
    use_history: bool,
}

impl ToolSelectionService {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            use_history: false,
        }
    }

    pub fn with_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    pub async fn select(&self, input: ToolSelectionInput<'_>) -> ToolDecision {
        let system_prompt = AgentPromptTemplate::tool_selection_system(
            input.domain_label,
            input.registry,
            input.conversation_summary,
        );
        let reminder = input.tool_context.map(AgentPromptTemplate::context_reminder);
        let user_prompt = AgentPromptTemplate::tool_selection_user(input.user_text, reminder.as_deref());

        let request = ChatRequest::new(user_prompt)
            .with_system_prompt(system_prompt)
            .with_history(self.use_history);

        let reply = match self.gateway.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(domain = input.domain_label, error = %e, "Tool selection call failed");
                return ToolDecision::fallback();
            }
        };

        let decision = match try_parse_decision(&reply, TOOL_DISCRIMINATOR) {
            Some(mapping) => ToolDecision::from_mapping(&mapping),
            None => {
                warn!(domain = input.domain_label, "No tool decision found in model reply");
                debug!(reply = %reply, "Unparseable tool-selection reply");
                return ToolDecision::fallback();
            }
        };

        match input.tool_context {
            Some(ctx) => keep_pending_operation(decision, ctx),
            None => decision,
        }
    }
}

/// Missing-but-collectible values are not a reason to fall back to chat.
///
/// If the model answers "chat" while an operation is paused, yet its
/// parameters carry values for the missing names, the decision is turned
/// back into the pending operation.
fn keep_pending_operation(decision: ToolDecision, ctx: &ToolContext) -> ToolDecision {
    if !decision.is_chat() {
        return decision;
    }

    let supplies_missing = ctx.missing_parameter_names.iter().any(|name| {
        decision
            .parameters
            .get(name)
            .is_some_and(|v| !matches!(v, Value::Null) && v.as_str().is_none_or(|s| !s.trim().is_empty()))
    });
    if !supplies_missing {
        return decision;
    }

    debug!(
        operation = %ctx.operation_name,
        "Chat decision carries pending parameters; keeping the paused operation"
    );
    let mut parameters = decision.parameters;
    parameters.remove("response");
    ToolDecision::new(ctx.operation_name.clone(), parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::use_cases::test_support::ScriptedGateway;
    use kubex_domain::{CLARIFICATION_RESPONSE, catalog::deployment};
    use serde_json::{Map, json};

    fn input<'a>(
        text: &'a str,
        registry: &'a ToolRegistry,
        ctx: Option<&'a ToolContext>,
    ) -> ToolSelectionInput<'a> {
        ToolSelectionInput {
            user_text: text,
            domain_label: "Kubernetes Deployment",
            registry,
            conversation_summary: "No conversation history yet.",
            tool_context: ctx,
        }
    }

    fn pending_scale() -> ToolContext {
        let mut extracted = Map::new();
        extracted.insert("deployment_name".to_string(), json!("nginx"));
        ToolContext::new(
            "scale_deployment",
            vec!["namespace".to_string(), "replicas".to_string()],
            extracted,
            "scale nginx",
        )
    }

    #[tokio::test]
    async fn test_selects_tool_from_noisy_reply() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            "<think>user wants scaling</think>\n{\"tool_name\": \"scale_deployment\", \"parameters\": {\"deployment_name\": \"nginx\"}}",
        ));
        let service = ToolSelectionService::new(gateway.clone());
        let registry = deployment::registry(None);

        let decision = service.select(input("scale nginx", &registry, None)).await;

        assert_eq!(decision.operation_name, "scale_deployment");
        assert_eq!(decision.parameters["deployment_name"], "nginx");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].use_history);
        let system = requests[0].system_prompt.as_deref().unwrap();
        assert!(system.contains("'scale_deployment'"));
        assert!(!system.contains("cluster_id"));
        assert_eq!(requests[0].user_prompt, "scale nginx");
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_without_retry() {
        let gateway = Arc::new(ScriptedGateway::new().chat_error(GatewayError::Timeout));
        let service = ToolSelectionService::new(gateway.clone());
        let registry = deployment::registry(None);

        let decision = service.select(input("scale nginx", &registry, None)).await;

        assert!(decision.is_chat());
        assert_eq!(decision.response(), Some(CLARIFICATION_RESPONSE));
        assert_eq!(gateway.chat_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply("Sure! I will scale it."));
        let service = ToolSelectionService::new(gateway);
        let registry = deployment::registry(None);

        let decision = service.select(input("scale nginx", &registry, None)).await;
        assert_eq!(decision, ToolDecision::fallback());
    }

    #[tokio::test]
    async fn test_reminder_is_prepended_while_pending() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            r#"{"tool_name": "scale_deployment", "parameters": {"namespace": "default", "replicas": 3}}"#,
        ));
        let service = ToolSelectionService::new(gateway.clone()).with_history(true);
        let registry = deployment::registry(None);
        let ctx = pending_scale();

        service.select(input("default, 3", &registry, Some(&ctx))).await;

        let requests = gateway.requests.lock().unwrap();
        assert!(requests[0].use_history);
        assert!(requests[0].user_prompt.starts_with("CONTEXT: You previously selected the 'scale_deployment' tool"));
        assert!(requests[0].user_prompt.ends_with("User message: default, 3"));
    }

    #[tokio::test]
    async fn test_chat_with_pending_values_is_coerced() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            r#"{"tool_name": "chat", "parameters": {"response": "ok", "namespace": "default"}}"#,
        ));
        let service = ToolSelectionService::new(gateway);
        let registry = deployment::registry(None);
        let ctx = pending_scale();

        let decision = service.select(input("default", &registry, Some(&ctx))).await;

        assert_eq!(decision.operation_name, "scale_deployment");
        assert_eq!(decision.parameters["namespace"], "default");
        assert!(!decision.parameters.contains_key("response"));
    }

    #[tokio::test]
    async fn test_plain_chat_while_pending_is_kept() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            r#"{"tool_name": "chat", "parameters": {"response": "What is a namespace? It groups resources."}}"#,
        ));
        let service = ToolSelectionService::new(gateway);
        let registry = deployment::registry(None);
        let ctx = pending_scale();

        let decision = service.select(input("what is a namespace?", &registry, Some(&ctx))).await;
        assert!(decision.is_chat());
    }
}
