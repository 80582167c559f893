//! CLI entrypoint for kubex
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use kubex_application::Router;
use kubex_domain::kubex_agents;
use kubex_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, KubexClient, OllamaGateway, operation_table,
};
use kubex_presentation::{ChatRepl, Cli, ReplConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting kubex");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    for warning in config.validate() {
        warn!(field = %warning.field, "{}", warning.message);
        eprintln!("warning: {}", warning);
    }

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("Effective configuration:");
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // === Dependency Injection ===
    let gateway = Arc::new(
        OllamaGateway::with_settings(
            &config.llm.base_url,
            &config.llm.model,
            config.llm.temperature,
            config.llm.timeout(),
        )
        .context("Failed to create the Ollama client")?,
    );
    if !gateway.test_connection().await {
        eprintln!(
            "warning: Ollama at {} is not reachable; requests will fail until it is",
            gateway.base_url()
        );
    }

    let client = KubexClient::new(&config.api.base_url, config.api.timeout())
        .context("Failed to create the Kubex API client")?;

    let profiles = kubex_agents().into_iter().map(|profile| {
        let operations = operation_table(&profile.build_registry(None), &client);
        (profile, operations)
    });

    let mut router = Router::from_profiles(gateway.clone(), profiles, config.engine_params())
        .with_follow_up_policy(config.routing.follow_up_policy());

    if let Some(path) = config.logging.conversation_log_path() {
        match JsonlConversationLogger::open(&path) {
            Ok(logger) => {
                info!(path = %logger.path().display(), "Conversation log enabled");
                router = router.with_logger(Arc::new(logger));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Conversation log disabled"),
        }
    }

    if let Some(cluster_id) = &cli.cluster {
        router.set_active_cluster(cluster_id.clone(), None);
    }

    let repl_config = ReplConfig {
        show_progress: !cli.quiet,
        history_file: config.repl.history_path(),
        show_thinking: config.repl.show_thinking,
    };
    let mut repl = ChatRepl::new(router, config.llm.model.clone()).with_config(repl_config);

    if let Some(question) = &cli.question {
        repl.ask(question).await?;
    }
    if cli.is_interactive() {
        repl.run().await?;
    }

    Ok(())
}

/// Console logging by verbosity (`RUST_LOG` wins), plus daily files when
/// a log directory is given.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "kubex.log"));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Command-line flags take precedence over every configuration source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(url) = &cli.llm_url {
        config.llm.base_url = url.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
}
