//! Agent-selection service: the router's decision step.
//!
//! Same machinery as tool selection, choosing among agent keys plus
//! `"chat"`. A failed call answers conversationally; a reply without any
//! agent name is left unrecognized so the router can say so.

use crate::ports::llm_gateway::{ChatRequest, LlmGateway};
use kubex_domain::decision::ROUTING_UNAVAILABLE_RESPONSE;
use kubex_domain::{AGENT_DISCRIMINATOR, AgentProfile, PromptTemplate, RoutingDecision, try_parse_decision};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AgentSelectionService {
    gateway: Arc<dyn LlmGateway>,
    use_history: bool,
}

impl AgentSelectionService {
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

    pub async fn select(
        &self,
        user_text: &str,
        agents: &[AgentProfile],
        context_summary: &str,
    ) -> RoutingDecision {
        let request = ChatRequest::new(user_text)
            .with_system_prompt(PromptTemplate::routing_system(agents, context_summary))
            .with_history(self.use_history);

        let reply = match self.gateway.chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Routing call failed");
                return RoutingDecision::chat(
                    ROUTING_UNAVAILABLE_RESPONSE,
                    format!("routing call failed: {}", e),
                );
            }
        };

        match try_parse_decision(&reply, AGENT_DISCRIMINATOR) {
            Some(mapping) => RoutingDecision::from_mapping(&mapping),
            None => {
                warn!("No routing decision found in model reply");
                debug!(reply = %reply, "Unparseable routing reply");
                RoutingDecision::unrecognized("unparseable routing reply")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::use_cases::test_support::ScriptedGateway;
    use kubex_domain::kubex_agents;

    #[tokio::test]
    async fn test_selects_agent() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            r#"{"agent": "deployment", "reasoning": "scaling is a deployment task"} Done."#,
        ));
        let service = AgentSelectionService::new(gateway.clone());

        let decision = service.select("scale nginx", &kubex_agents(), "summary").await;

        assert_eq!(decision.agent.as_deref(), Some("deployment"));
        assert_eq!(decision.reasoning, "scaling is a deployment task");
        let requests = gateway.requests.lock().unwrap();
        assert!(requests[0].system_prompt.as_deref().unwrap().contains("- repository: Helm Repository"));
    }

    #[tokio::test]
    async fn test_chat_decision_carries_response() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply(
            r#"{"agent": "chat", "reasoning": "greeting", "response": "Hello!"}"#,
        ));
        let decision = AgentSelectionService::new(gateway)
            .select("hi", &kubex_agents(), "")
            .await;
        assert!(decision.is_chat());
        assert_eq!(decision.response.as_deref(), Some("Hello!"));
    }

    #[tokio::test]
    async fn test_transport_failure_answers_conversationally() {
        let gateway = Arc::new(
            ScriptedGateway::new().chat_error(GatewayError::ConnectionError("refused".to_string())),
        );
        let decision = AgentSelectionService::new(gateway)
            .select("hi", &kubex_agents(), "")
            .await;
        assert!(decision.is_chat());
        assert_eq!(decision.response.as_deref(), Some(ROUTING_UNAVAILABLE_RESPONSE));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_unrecognized() {
        let gateway = Arc::new(ScriptedGateway::new().chat_reply("I think deployments?"));
        let decision = AgentSelectionService::new(gateway)
            .select("scale", &kubex_agents(), "")
            .await;
        assert_eq!(decision.agent, None);
    }
}
