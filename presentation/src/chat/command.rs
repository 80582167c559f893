//! Slash commands of the chat REPL

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Clusters,
    /// Bind a cluster by id (or by the name of a listed cluster)
    Use {
        cluster: String,
        name: Option<String>,
    },
    History,
    SoftReset,
    Reset,
    Quit,
}

impl Command {
    /// Parse a line starting with `/`; the error is the text to show
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();

        match command {
            "/help" | "/h" | "/?" => Ok(Command::Help),
            "/status" => Ok(Command::Status),
            "/clusters" => Ok(Command::Clusters),
            "/use" => {
                let Some(cluster) = words.next() else {
                    return Err("Usage: /use <cluster-id> [display name]".to_string());
                };
                let name = words.collect::<Vec<_>>().join(" ");
                Ok(Command::Use {
                    cluster: cluster.to_string(),
                    name: (!name.is_empty()).then_some(name),
                })
            }
            "/history" => Ok(Command::History),
            "/soft-reset" => Ok(Command::SoftReset),
            "/reset" => Ok(Command::Reset),
            "/quit" | "/exit" | "/q" => Ok(Command::Quit),
            other => Err(format!(
                "Unknown command: {}\nType /help for available commands",
                other
            )),
        }
    }
}

/// Resolve a `/use` argument against the listed clusters.
///
/// An id or name of a listed cluster yields that cluster's id and name; an
/// explicit display name always wins. Anything else is taken as an id.
pub fn resolve_cluster(
    clusters: &[Value],
    cluster: &str,
    name: Option<String>,
) -> (String, Option<String>) {
    let text = |record: &Value, key: &str| match record.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    let matched = clusters.iter().find(|record| {
        text(record, "id").as_deref() == Some(cluster) || text(record, "name").as_deref() == Some(cluster)
    });

    match matched {
        Some(record) => (
            text(record, "id").unwrap_or_else(|| cluster.to_string()),
            name.or_else(|| text(record, "name")),
        ),
        None => (cluster.to_string(), name),
    }
}
