//! Decision value objects produced by the selection services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Discriminator key of a tool-selection reply
pub const TOOL_DISCRIMINATOR: &str = "tool_name";

/// Discriminator key of a routing reply
pub const AGENT_DISCRIMINATOR: &str = "agent";

/// Sentinel operation meaning "no operation, answer conversationally"
pub const CHAT_OPERATION: &str = "chat";

/// Reply substituted when the model's output cannot be understood
pub const CLARIFICATION_RESPONSE: &str =
    "I couldn't work out what you need. Could you rephrase the request a little more specifically?";

/// Reply substituted when the routing call itself fails
pub const ROUTING_UNAVAILABLE_RESPONSE: &str =
    "I can't process your request right now. Please try again with a clearer request.";

/// A tool-selection decision: `{operation_name, parameters}`.
///
/// `operation_name == "chat"` (or empty) carries a `response` parameter
/// instead of real arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDecision {
    pub operation_name: String,
    pub parameters: Map<String, Value>,
}

impl ToolDecision {
    pub fn new(operation_name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            operation_name: operation_name.into(),
            parameters,
        }
    }

    /// A conversational decision carrying `response`
    pub fn chat(response: impl Into<String>) -> Self {
        let mut parameters = Map::new();
        parameters.insert("response".to_string(), Value::String(response.into()));
        Self::new(CHAT_OPERATION, parameters)
    }

    /// The safe default used whenever a decision cannot be recovered
    pub fn fallback() -> Self {
        Self::chat(CLARIFICATION_RESPONSE)
    }

    /// Normalize a mapping recovered by the extractor.
    ///
    /// A missing or non-string `tool_name` yields an empty operation name
    /// (treated as chat). A top-level `response` is folded into the
    /// parameters when the model put it outside of them.
    pub fn from_mapping(mapping: &Map<String, Value>) -> Self {
        let operation_name = mapping
            .get(TOOL_DISCRIMINATOR)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let mut parameters = match mapping.get("parameters") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        if let Some(Value::String(response)) = mapping.get("response")
            && !parameters.contains_key("response")
        {
            parameters.insert("response".to_string(), Value::String(response.clone()));
        }

        Self::new(operation_name, parameters)
    }

    pub fn is_chat(&self) -> bool {
        self.operation_name.is_empty() || self.operation_name == CHAT_OPERATION
    }

    /// The conversational reply of a chat decision
    pub fn response(&self) -> Option<&str> {
        self.parameters
            .get("response")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn to_value(&self) -> Value {
        json!({
            TOOL_DISCRIMINATOR: self.operation_name,
            "parameters": self.parameters,
        })
    }
}

/// A routing decision: `{agent, reasoning, response?}`.
///
/// `agent == None` means the reply named no agent at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: Option<String>,
    pub reasoning: String,
    pub response: Option<String>,
}

impl RoutingDecision {
    pub fn chat(response: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            agent: Some(CHAT_OPERATION.to_string()),
            reasoning: reasoning.into(),
            response: Some(response.into()),
        }
    }

    /// A decision that names nothing; routed as "category not recognized"
    pub fn unrecognized(reasoning: impl Into<String>) -> Self {
        Self {
            agent: None,
            reasoning: reasoning.into(),
            response: None,
        }
    }

    pub fn from_mapping(mapping: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            mapping
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
        };

        Self {
            agent: text(AGENT_DISCRIMINATOR).filter(|s| !s.is_empty()),
            reasoning: text("reasoning").unwrap_or_default(),
            response: text("response").filter(|s| !s.is_empty()),
        }
    }

    pub fn is_chat(&self) -> bool {
        self.agent.as_deref() == Some(CHAT_OPERATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fallback_is_chat_with_clarification() {
        let decision = ToolDecision::fallback();
        assert!(decision.is_chat());
        assert_eq!(decision.response(), Some(CLARIFICATION_RESPONSE));
        assert_eq!(
            decision.to_value(),
            json!({"tool_name": "chat", "parameters": {"response": CLARIFICATION_RESPONSE}})
        );
    }

    #[test]
    fn test_from_mapping_reads_parameters() {
        let decision = ToolDecision::from_mapping(&mapping(json!({
            "tool_name": "scale_deployment",
            "parameters": {"deployment_name": "nginx"}
        })));
        assert_eq!(decision.operation_name, "scale_deployment");
        assert!(!decision.is_chat());
        assert_eq!(decision.parameters["deployment_name"], "nginx");
    }

    #[test]
    fn test_from_mapping_tolerates_bad_shapes() {
        let decision = ToolDecision::from_mapping(&mapping(json!({
            "tool_name": 12,
            "parameters": "none"
        })));
        assert!(decision.is_chat());
        assert!(decision.parameters.is_empty());
    }

    #[test]
    fn test_from_mapping_folds_top_level_response() {
        let decision = ToolDecision::from_mapping(&mapping(json!({
            "tool_name": "chat",
            "response": "hello"
        })));
        assert_eq!(decision.response(), Some("hello"));
    }

    #[test]
    fn test_blank_response_is_none() {
        assert_eq!(ToolDecision::chat("   ").response(), None);
    }

    #[test]
    fn test_routing_from_mapping() {
        let decision = RoutingDecision::from_mapping(&mapping(json!({
            "agent": "deployment",
            "reasoning": "scaling request"
        })));
        assert_eq!(decision.agent.as_deref(), Some("deployment"));
        assert!(!decision.is_chat());
        assert_eq!(decision.response, None);

        let empty = RoutingDecision::from_mapping(&mapping(json!({"agent": ""})));
        assert_eq!(empty.agent, None);
    }
}
