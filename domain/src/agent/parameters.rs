//! Parameter handling for a selected operation.
//!
//! Runs in a fixed order for every decision that names a known tool:
//! contextual injection first, then missing-parameter detection, then (if
//! anything is missing) question generation. Injection happening first is
//! what guarantees `cluster_id` is never reported as missing while a
//! cluster is bound.

use crate::core::error::DomainError;
use crate::tool::{CLUSTER_ID_PARAMETER, ToolDefinition, ToolParameter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Status value of a [`ParameterRequest`]
pub const NEEDS_PARAMETERS: &str = "needs_parameters";

/// The cluster the user currently works on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveClusterBinding {
    pub cluster_id: String,
    pub cluster_name: Option<String>,
}

impl ActiveClusterBinding {
    pub fn new(cluster_id: impl Into<String>, cluster_name: Option<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            cluster_name,
        }
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        self.cluster_name.as_deref().unwrap_or(&self.cluster_id)
    }
}

/// Values bindable by contextual injection, e.g. `{cluster_id: ...}`
pub fn contextual_parameters(binding: Option<&ActiveClusterBinding>) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(binding) = binding {
        params.insert(
            CLUSTER_ID_PARAMETER.to_string(),
            Value::String(binding.cluster_id.clone()),
        );
    }
    params
}

/// Fill contextual parameters the tool declares but the decision left out
/// (absent, null or blank).
pub fn inject_contextual(
    tool: &ToolDefinition,
    params: &mut Map<String, Value>,
    contextual: &Map<String, Value>,
) {
    for param in tool.parameters.iter().filter(|p| p.is_contextual()) {
        if is_blank(params.get(&param.name))
            && let Some(value) = contextual.get(&param.name)
        {
            params.insert(param.name.clone(), value.clone());
        }
    }
}

/// Required, non-contextual parameters that are absent or blank, in
/// declaration order.
pub fn missing_parameters(tool: &ToolDefinition, params: &Map<String, Value>) -> Vec<String> {
    tool.required_parameters()
        .filter(|p| !p.is_contextual())
        .filter(|p| is_blank(params.get(&p.name)))
        .map(|p| p.name.clone())
        .collect()
}

/// Absent, null and whitespace-only strings all count as "not provided"
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Human-oriented question for one missing parameter
pub fn question_for(param: &ToolParameter) -> String {
    let tailored = match param.name.as_str() {
        "deployment_name" => Some("Which deployment should this apply to? (e.g. nginx)"),
        "namespace" | "namespace_name" => Some("Which namespace is it in? (e.g. default)"),
        "replicas" => Some("How many replicas should it run?"),
        "image" => Some("Which container image should be used? (e.g. registry.example.com/app:v1.2)"),
        "url" => Some("What is the URL of the Helm repository?"),
        "name" => Some("What name should be used?"),
        "repository_name" => Some("Which Helm repository do you mean? (its short name)"),
        "chart" => Some("Which chart should be installed? (format: repository/chart)"),
        _ => None,
    };

    match tailored {
        Some(text) => text.to_string(),
        None if !param.description.trim().is_empty() => param.description.clone(),
        None => generic_question(&param.name),
    }
}

fn generic_question(name: &str) -> String {
    format!("Please provide a value for `{}`.", name)
}

/// One question per missing name, in the same order
pub fn questions_for(tool: &ToolDefinition, missing: &[String]) -> Vec<String> {
    missing
        .iter()
        .map(|name| match tool.parameter(name) {
            Some(param) => question_for(param),
            None => generic_question(name),
        })
        .collect()
}

/// Interpret a typed-in answer by the parameter's declared type.
///
/// `integer` and `boolean` must parse, `object` must be a JSON object and
/// `array` takes a JSON array or a single item. Any other type keeps the
/// text as a string, however numeric it looks.
pub fn coerce_answer(name: &str, param_type: &str, answer: &str) -> Result<Value, DomainError> {
    let answer = answer.trim();
    let invalid = |reason: &str| DomainError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match param_type {
        "integer" => answer
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("expected a whole number")),
        "boolean" => match answer.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(Value::Bool(true)),
            "false" | "no" | "n" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected yes or no")),
        },
        "object" => match serde_json::from_str::<Value>(answer) {
            Ok(value @ Value::Object(_)) => Ok(value),
            _ => Err(invalid("expected a JSON object such as {\"key\": \"value\"}")),
        },
        "array" if answer.starts_with('[') => match serde_json::from_str::<Value>(answer) {
            Ok(value @ Value::Array(_)) => Ok(value),
            _ => Err(invalid("expected a JSON array")),
        },
        "array" => Ok(Value::Array(vec![Value::String(answer.to_string())])),
        _ => Ok(Value::String(answer.to_string())),
    }
}

/// The structured pause returned when an operation cannot run yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRequest {
    pub status: String,
    pub operation_name: String,
    pub missing_parameter_names: Vec<String>,
    pub questions: Vec<String>,
    pub extracted_parameters: Map<String, Value>,
    /// Declared type of each missing parameter
    #[serde(default)]
    pub parameter_types: BTreeMap<String, String>,
}

impl ParameterRequest {
    pub fn new(
        tool: &ToolDefinition,
        missing_parameter_names: Vec<String>,
        extracted_parameters: Map<String, Value>,
    ) -> Self {
        let parameter_types = missing_parameter_names
            .iter()
            .filter_map(|name| tool.parameter(name))
            .map(|param| (param.name.clone(), param.param_type.clone()))
            .collect();

        Self {
            status: NEEDS_PARAMETERS.to_string(),
            operation_name: tool.name.clone(),
            questions: questions_for(tool, &missing_parameter_names),
            missing_parameter_names,
            extracted_parameters,
            parameter_types,
        }
    }

    /// Declared type of a missing parameter, `string` when unknown
    pub fn parameter_type(&self, name: &str) -> &str {
        self.parameter_types.get(name).map_or("string", String::as_str)
    }

    /// Turn a form answer into the value sent for `name`
    pub fn coerce(&self, name: &str, answer: &str) -> Result<Value, DomainError> {
        coerce_answer(name, self.parameter_type(name), answer)
    }

    /// Pairs of (parameter name, question)
    pub fn prompts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.missing_parameter_names
            .iter()
            .map(String::as_str)
            .zip(self.questions.iter().map(String::as_str))
    }
}
