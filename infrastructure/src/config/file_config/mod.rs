//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section falls back to its defaults field by field.

mod api;
mod llm;
mod logging;
mod memory;
mod repl;
mod routing;

pub use api::FileApiConfig;
pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;
pub use memory::FileMemoryConfig;
pub use repl::FileReplConfig;
pub use routing::FileRoutingConfig;

use kubex_application::EngineParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Ollama connection and model
    pub llm: FileLlmConfig,
    /// Kubex REST API connection
    pub api: FileApiConfig,
    /// Conversation memory limits
    pub memory: FileMemoryConfig,
    /// Follow-up routing
    pub routing: FileRoutingConfig,
    /// Conversation audit log
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

/// A suspicious configuration value; reported, never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field (e.g. "llm.model")
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning every warning found.
    ///
    /// Checks empty model names and URLs, non-positive timeouts and memory
    /// limits that would keep nothing.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.llm.model.trim().is_empty() {
            warnings.push(ConfigWarning::new("llm.model", "model name cannot be empty"));
        }
        for (field, url) in [("llm.base_url", &self.llm.base_url), ("api.base_url", &self.api.base_url)] {
            if url.trim().is_empty() {
                warnings.push(ConfigWarning::new(field, "base URL cannot be empty"));
            } else if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning::new(
                    field,
                    format!("'{url}' does not start with http:// or https://"),
                ));
            }
        }
        for (field, secs) in [("llm.timeout_secs", self.llm.timeout_secs), ("api.timeout_secs", self.api.timeout_secs)] {
            if secs == 0 {
                warnings.push(ConfigWarning::new(field, "timeout of 0 seconds fails every request"));
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            warnings.push(ConfigWarning::new(
                "llm.temperature",
                format!("{} is outside 0.0..=2.0", self.llm.temperature),
            ));
        }
        for field in self.memory.zero_fields() {
            warnings.push(ConfigWarning::new(
                format!("memory.{field}"),
                "0 disables this part of the conversation memory",
            ));
        }
        if self.routing.sticky_follow_ups && self.routing.follow_up_cues.is_empty() {
            warnings.push(ConfigWarning::new(
                "routing.follow_up_cues",
                "sticky follow-ups are on but no cues are configured",
            ));
        }

        warnings
    }

    /// Session parameters for the router and its agents
    pub fn engine_params(&self) -> EngineParams {
        EngineParams::default()
            .with_global_capacity(self.memory.global_capacity)
            .with_agent_capacity(self.memory.agent_capacity)
            .with_summary(self.memory.summary_turns, self.memory.summary_chars)
            .with_sync_turns(self.memory.sync_turns)
            .with_shared_history(self.llm.share_history)
            .with_sticky_follow_ups(self.routing.sticky_follow_ups)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").zip(dirs::home_dir()) {
        Some((rest, home)) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    fn parse(toml: &str) -> FileConfig {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    #[test]
    fn test_deserialize_full_config() {
        let config = parse(
            r#"
[llm]
base_url = "http://gpu-box:11434"
model = "llama3.1:8b"
temperature = 0.2
share_history = true

[api]
base_url = "https://kubex.example.com"
timeout_secs = 10

[memory]
global_capacity = 20
summary_chars = 120

[routing]
follow_up_cues = ["those"]
sticky_follow_ups = false

[logging]
conversation_log = "/tmp/kubex.jsonl"

[repl]
show_thinking = true
"#,
        );

        assert_eq!(config.llm.model, "llama3.1:8b");
        assert!(config.llm.share_history);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.api.base_url, "https://kubex.example.com");
        assert_eq!(config.memory.global_capacity, 20);
        assert_eq!(config.memory.agent_capacity, 5);
        assert_eq!(config.routing.follow_up_cues, vec!["those".to_string()]);
        assert_eq!(
            config.logging.conversation_log_path(),
            Some(PathBuf::from("/tmp/kubex.jsonl"))
        );
        assert!(config.repl.show_thinking);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "qwen3:4b");
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.routing.sticky_follow_ups);
        assert!(!config.routing.follow_up_cues.is_empty());
        assert!(config.logging.conversation_log.is_none());
        assert!(!config.repl.show_thinking);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let config = parse(
            r#"
[llm]
model = "  "
base_url = "localhost:11434"

[api]
timeout_secs = 0

[memory]
agent_capacity = 0
"#,
        );

        let fields: Vec<String> = config.validate().into_iter().map(|w| w.field).collect();
        assert_eq!(
            fields,
            vec!["llm.model", "llm.base_url", "api.timeout_secs", "memory.agent_capacity"]
        );
    }

    #[test]
    fn test_engine_params_follow_config() {
        let config = parse(
            r#"
[llm]
share_history = true

[memory]
global_capacity = 4
sync_turns = 1

[routing]
sticky_follow_ups = false
"#,
        );

        let params = config.engine_params();
        assert_eq!(params.global_capacity, 4);
        assert_eq!(params.sync_turns, 1);
        assert_eq!(params.agent_capacity, 5);
        assert!(params.share_history);
        assert!(!params.sticky_follow_ups);
    }

    #[test]
    fn test_follow_up_policy_from_cues() {
        let config = parse(
            r#"
[routing]
follow_up_cues = ["and the pods"]
"#,
        );
        let policy = config.routing.follow_up_policy();
        assert!(policy.is_follow_up("And the pods?"));
        assert!(!policy.is_follow_up("why?"));

        let off = parse("[routing]\nsticky_follow_ups = false\n");
        assert!(!off.routing.follow_up_policy().is_follow_up("why?"));
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::new("llm.model", "model name cannot be empty");
        assert_eq!(warning.to_string(), "llm.model: model name cannot be empty");
    }
}
