//! Domain agent entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dialogue state of a domain agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// No operation is pending
    Idle,
    /// A [`ToolContext`] exists and the next turn should supply its values
    AwaitingParameters,
}

impl AgentState {
    pub fn as_str(&self) -> &str {
        match self {
            AgentState::Idle => "idle",
            AgentState::AwaitingParameters => "awaiting_parameters",
        }
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The paused state of an operation whose required parameters are incomplete.
///
/// A domain agent holds at most one of these at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContext {
    pub operation_name: String,
    /// Missing names in declaration order, without duplicates
    pub missing_parameter_names: Vec<String>,
    pub extracted_parameters: Map<String, Value>,
    pub originating_request: String,
}

impl ToolContext {
    pub fn new(
        operation_name: impl Into<String>,
        missing: impl IntoIterator<Item = String>,
        extracted_parameters: Map<String, Value>,
        originating_request: impl Into<String>,
    ) -> Self {
        let mut missing_parameter_names: Vec<String> = Vec::new();
        for name in missing {
            if !missing_parameter_names.contains(&name) {
                missing_parameter_names.push(name);
            }
        }

        Self {
            operation_name: operation_name.into(),
            missing_parameter_names,
            extracted_parameters,
            originating_request: originating_request.into(),
        }
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.missing_parameter_names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_are_ordered_and_unique() {
        let ctx = ToolContext::new(
            "scale_deployment",
            ["namespace", "replicas", "namespace"].map(String::from),
            Map::new(),
            "scale nginx",
        );
        assert_eq!(ctx.missing_parameter_names, vec!["namespace", "replicas"]);
        assert!(ctx.is_missing("replicas"));
        assert!(!ctx.is_missing("deployment_name"));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AgentState::AwaitingParameters.to_string(), "awaiting_parameters");
    }
}
