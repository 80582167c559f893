//! Console output formatting for conversation turns

use crate::output::think::Segment;
use colored::Colorize;
use kubex_application::{FailureKind, RouterStatus};
use kubex_domain::{ConversationTurn, ParameterRequest};
use kubex_domain::util::truncate_str;
use serde_json::Value;

/// Characters of each message shown by `/history`
const HISTORY_PREVIEW_CHARS: usize = 100;

/// Formats router replies and state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn welcome(model: &str, categories: &[&str]) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&Self::header("Kubex - Kubernetes Assistant"));
        output.push_str(&format!("\n{} {}\n", "Model:".cyan().bold(), model));
        output.push_str(&format!(
            "{} {}\n\n",
            "Agents:".cyan().bold(),
            categories.join(", ")
        ));
        output.push_str(&Self::help());
        output
    }

    pub fn help() -> String {
        let commands = [
            ("/help, /h, /?", "Show this help"),
            ("/status", "Show the active agent, pending operation and cluster"),
            ("/clusters", "List registered clusters"),
            ("/use <id> [name]", "Make a cluster the active one"),
            ("/history", "Show recent interactions"),
            ("/soft-reset", "Cancel pending questions, keep the history"),
            ("/reset", "Forget everything"),
            ("/quit, /exit, /q", "Exit chat"),
        ];
        let mut output = format!("{}\n", "Commands:".bold());
        for (command, description) in commands {
            output.push_str(&format!("  {:<18} - {}\n", command, description));
        }
        output
    }

    /// A stream segment ready to print, or `None` when it is hidden
    pub fn segment(segment: &Segment, show_thinking: bool) -> Option<String> {
        match segment {
            Segment::Text(text) => Some(text.clone()),
            Segment::Thought(thought) if show_thinking => Some(thought.dimmed().to_string()),
            Segment::Thought(_) => None,
        }
    }

    pub fn failure(kind: FailureKind, message: &str) -> String {
        let label = match kind {
            FailureKind::UnknownOperation => "Unknown operation",
            FailureKind::UnrecognizedCategory => "Not understood",
            FailureKind::NoActiveAgent => "Cancelled",
        };
        format!("{} {}", format!("{label}:").yellow().bold(), message)
    }

    /// Heading shown before the missing-parameter questions
    pub fn form_header(request: &ParameterRequest) -> String {
        format!(
            "{} {} needs {}",
            "?".yellow().bold(),
            request.operation_name.bold(),
            request.missing_parameter_names.join(", ")
        )
    }

    pub fn status(status: &RouterStatus) -> String {
        let none = || "none".dimmed().to_string();
        let mut output = format!("{}\n", "Status".cyan().bold());

        output.push_str(&format!(
            "  Active agent:    {}\n",
            status.active_agent.clone().unwrap_or_else(none)
        ));
        output.push_str(&format!(
            "  Active cluster:  {}\n",
            status
                .active_cluster
                .as_ref()
                .map(|b| format!("{} ({})", b.display_name(), b.cluster_id))
                .unwrap_or_else(none)
        ));
        match &status.tool_context {
            Some(ctx) if status.awaiting_parameters => {
                output.push_str(&format!(
                    "  Pending:         {} (missing {})\n",
                    ctx.operation_name.yellow(),
                    ctx.missing_parameter_names.join(", ")
                ));
            }
            _ => output.push_str(&format!("  Pending:         {}\n", none())),
        }
        output.push_str(&format!(
            "  Memory:          {} turns ({} from agents)\n",
            status.global_memory_len, status.agent_turns
        ));
        output
    }

    pub fn clusters(clusters: &[Value], active: Option<&str>) -> String {
        if clusters.is_empty() {
            return format!("{}\n", "No clusters found.".dimmed());
        }

        let mut output = format!("{}\n", "Clusters".cyan().bold());
        for cluster in clusters {
            let id = cluster_field(cluster, "id");
            let name = cluster_field(cluster, "name");
            let marker = if active == Some(id.as_str()) {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!("  {} {:<24} {}\n", marker, name, id.dimmed()));
        }
        output
    }

    pub fn history(turns: &[ConversationTurn]) -> String {
        if turns.is_empty() {
            return format!("{}\n", "No interactions yet.".dimmed());
        }

        let mut output = String::new();
        for (i, turn) in turns.iter().enumerate() {
            output.push_str(&format!(
                "{} {} {}\n",
                format!("{}.", i + 1).dimmed(),
                format!("[{}]", turn.origin).cyan(),
                truncate_str(&turn.user_message, HISTORY_PREVIEW_CHARS)
            ));
            output.push_str(&format!(
                "   {}\n",
                truncate_str(&turn.assistant_message, HISTORY_PREVIEW_CHARS)
            ));
        }
        output
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(50);
        format!("{}\n{:^50}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }
}

/// A cluster record field as text, whatever its JSON type
fn cluster_field(cluster: &Value, key: &str) -> String {
    match cluster.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}
