//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for kubex
#[derive(Parser, Debug)]
#[command(name = "kubex")]
#[command(author, version, about = "Conversational Kubernetes administration assistant")]
#[command(long_about = r#"
Kubex answers questions and runs operations against a Kubex-managed
Kubernetes platform. Each request is routed to a domain agent (clusters,
namespaces, deployments, Helm repositories) which picks an operation,
asks for anything missing, executes it and summarizes the result.

Configuration files are loaded from (in priority order):
1. KUBEX_* environment variables (e.g. KUBEX_LLM__MODEL)
2. --config <path>     Explicit config file
3. ./kubex.toml        Project-level config
4. ~/.config/kubex/config.toml   Global config

Example:
  kubex "how many deployments are running?" --cluster c-1
  kubex --chat --model llama3.1:8b
"#)]
pub struct Cli {
    /// A single request to route (interactive chat when omitted)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Ollama model to use for every call
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long, value_name = "URL")]
    pub llm_url: Option<String>,

    /// Kubex API URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Cluster id to bind before the first request
    #[arg(long, value_name = "ID")]
    pub cluster: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write diagnostic logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and effective values, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Interactive unless a question was given without `--chat`
    pub fn is_interactive(&self) -> bool {
        self.chat || self.question.is_none()
    }
}
