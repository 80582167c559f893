//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Reserved parameter supplied by context injection.
///
/// Never rendered into a tool-selection prompt, never asked of the user.
pub const CLUSTER_ID_PARAMETER: &str = "cluster_id";

/// Where a parameter travels when the operation is sent to the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Substituted into a `{name}` placeholder of the path template
    Path,
    /// Appended to the query string
    Query,
    /// Sent as a field of the JSON body
    Body,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Body => "body",
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP method of a remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether body parameters are sent as a JSON payload
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a remote operation the model may select
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "scale_deployment")
    pub name: String,
    /// One-line summary shown to the model
    pub summary: String,
    /// Longer explanation of when the tool applies
    #[serde(default)]
    pub description: String,
    /// HTTP method of the remote call
    pub method: HttpMethod,
    /// Path template, may contain `{name}` placeholders
    pub path: String,
    /// Parameter specifications, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name, unique within its tool
    pub name: String,
    /// Where the value is sent
    pub location: ParameterLocation,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "integer", "array", "object")
    pub param_type: String,
    /// Parameter description
    pub description: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        summary: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            description: String::new(),
            method,
            path: path.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a parameter; a later parameter with the same name replaces the earlier one.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        if let Some(existing) = self.parameters.iter_mut().find(|p| p.name == param.name) {
            *existing = param;
        } else {
            self.parameters.push(param);
        }
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    /// Parameters the model and the user are allowed to see
    pub fn visible_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| !p.is_contextual())
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Whether the operation is scoped to the active cluster
    pub fn is_cluster_scoped(&self) -> bool {
        self.declares(CLUSTER_ID_PARAMETER)
    }

    /// Substitute `{name}` placeholders of the path template.
    ///
    /// Strings are inserted as-is, other JSON values by their compact
    /// rendering. A placeholder without a value is an error, and so is a
    /// value that would not stay a single segment (see [`is_path_segment`]).
    /// Percent-encoding is left to the HTTP adapter.
    pub fn render_path(&self, params: &Map<String, Value>) -> Result<String, DomainError> {
        let mut rendered = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + close];
            rendered.push_str(&rest[..open]);

            let value = params
                .get(name)
                .filter(|v| !v.is_null())
                .ok_or_else(|| DomainError::MissingPathParameter {
                    tool: self.name.clone(),
                    parameter: name.to_string(),
                })?;
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !is_path_segment(&value) {
                return Err(DomainError::InvalidPathParameter {
                    tool: self.name.clone(),
                    parameter: name.to_string(),
                    value,
                });
            }
            rendered.push_str(&value);
            rest = &rest[open + close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }
}

/// Whether `value` can fill a path placeholder without changing the
/// route: non-blank, not a dot segment, and free of separators.
pub fn is_path_segment(value: &str) -> bool {
    !value.trim().is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '?', '#'])
}

impl ToolParameter {
    /// A string body parameter
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Body,
            required,
            param_type: "string".to_string(),
            description: description.into(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn at(mut self, location: ParameterLocation) -> Self {
        self.location = location;
        self
    }

    /// The reserved cluster parameter, supplied by context injection
    pub fn cluster_id(location: ParameterLocation) -> Self {
        Self::new(CLUSTER_ID_PARAMETER, "Identifier of the active cluster", true).at(location)
    }

    /// Whether the value comes from context instead of the user
    pub fn is_contextual(&self) -> bool {
        self.name == CLUSTER_ID_PARAMETER
    }
}

/// Catalog of the operations one domain agent can call.
///
/// Tools keep their registration order so prompts list them the same way
/// every turn. Registries are built once and replaced, never mutated, when
/// the context they were built for changes.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "scale" → "scale_deployment")
    aliases: HashMap<String, String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a tool with the same name is replaced in place.
    pub fn register(mut self, tool: ToolDefinition) -> Self {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == tool.name) {
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
        self
    }

    /// Register a single alias mapping (builder pattern)
    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Register multiple aliases at once (builder pattern)
    pub fn register_aliases(
        mut self,
        mappings: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (alias, canonical) in mappings {
            self.aliases.insert(alias.into(), canonical.into());
        }
        self
    }

    /// Resolve an alias to its canonical name (aliases only, not canonical names)
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    /// Resolve a name: returns canonical name if it's a registered tool,
    /// or resolves alias, or None if unknown
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.get_tool(name).is_some() {
            Some(name)
        } else {
            self.resolve_alias(name)
                .filter(|canonical| self.get_tool(canonical).is_some())
        }
    }

    /// Get tool definition by canonical name or alias
    pub fn get_resolved(&self, name: &str) -> Option<&ToolDefinition> {
        self.resolve(name).and_then(|canonical| self.get_tool(canonical))
    }

    /// Exact-name lookup
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All tools in registration order
    pub fn get_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
