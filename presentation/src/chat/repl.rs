//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::command::{Command, resolve_cluster};
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::output::think::{Segment, ThinkFilter};
use crate::progress::spinner::ThinkingSpinner;
use colored::Colorize;
use kubex_application::{ReplyStream, Router, TurnReply};
use kubex_domain::ParameterRequest;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use serde_json::{Map, Value};
use std::io::{self, Write};
use tracing::{debug, info};

/// Interactive chat REPL over a [`Router`]
pub struct ChatRepl {
    router: Router,
    model: String,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(router: Router, model: impl Into<String>) -> Self {
        Self {
            router,
            model: model.into(),
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        println!(
            "{}",
            ConsoleFormatter::welcome(&self.model, &self.router.available_categories())
        );

        loop {
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        match Command::parse(line) {
                            Ok(command) => {
                                if self.handle_command(command).await {
                                    break;
                                }
                            }
                            Err(message) => println!("{}", message),
                        }
                        continue;
                    }

                    self.process_request(&mut rl, line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(&format!("{:?}", err)));
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Route a single request, asking for missing parameters on the terminal
    pub async fn ask(&mut self, question: &str) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;
        self.process_request(&mut rl, question).await;
        Ok(())
    }

    fn prompt(&self) -> String {
        match self.router.active_cluster() {
            Some(binding) => format!("kubex[{}]> ", binding.display_name()),
            None => "kubex> ".to_string(),
        }
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => println!("\n{}", ConsoleFormatter::help()),
            Command::Status => println!("\n{}", ConsoleFormatter::status(&self.router.status())),
            Command::Clusters => {
                let clusters = self.router.list_clusters().await;
                let active = self.router.active_cluster().map(|b| b.cluster_id.as_str());
                println!("\n{}", ConsoleFormatter::clusters(&clusters, active));
            }
            Command::Use { cluster, name } => {
                let clusters = self.router.list_clusters().await;
                let (cluster_id, cluster_name) = resolve_cluster(&clusters, &cluster, name);
                info!(cluster_id = %cluster_id, "Active cluster selected from REPL");
                self.router.set_active_cluster(cluster_id, cluster_name);
                if let Some(binding) = self.router.active_cluster() {
                    println!(
                        "Active cluster: {} ({})",
                        binding.display_name().green().bold(),
                        binding.cluster_id
                    );
                }
            }
            Command::History => println!("\n{}", ConsoleFormatter::history(&self.router.global_turns())),
            Command::SoftReset => {
                self.router.soft_reset();
                println!("{}", "Pending questions cleared.".dimmed());
            }
            Command::Reset => {
                self.router.reset_all().await;
                println!("{}", "Conversation reset.".dimmed());
            }
        }
        false
    }

    async fn process_request(&mut self, rl: &mut DefaultEditor, text: &str) {
        println!();
        let reply = self.router.route(text).await;
        self.render(rl, reply).await;
        println!();
    }

    /// Print a reply, running the parameter form as often as asked
    async fn render(&mut self, rl: &mut DefaultEditor, mut reply: TurnReply) {
        loop {
            match reply {
                TurnReply::Streamed(stream) => {
                    self.print_stream(stream).await;
                    return;
                }
                TurnReply::Failed { kind, message } => {
                    println!("{}", ConsoleFormatter::failure(kind, &message));
                    return;
                }
                TurnReply::NeedsParameters(request) => {
                    println!("{}", ConsoleFormatter::form_header(&request));
                    let Some(collected) = fill_form(rl, &request) else {
                        self.router.soft_reset();
                        println!("{}", "Cancelled.".dimmed());
                        return;
                    };
                    let ParameterRequest {
                        operation_name,
                        extracted_parameters,
                        ..
                    } = request;
                    reply = self
                        .router
                        .finalize_request(&operation_name, extracted_parameters, collected)
                        .await;
                }
            }
        }
    }

    async fn print_stream(&self, mut stream: ReplyStream) {
        let mut spinner = ThinkingSpinner::start("Thinking...", self.config.show_progress);
        let mut filter = ThinkFilter::new();
        let mut stdout = io::stdout();

        while let Some(chunk) = stream.next_chunk().await {
            for segment in filter.push(&chunk) {
                self.print_segment(&segment, &mut spinner, &mut stdout);
            }
        }
        for segment in filter.finish() {
            self.print_segment(&segment, &mut spinner, &mut stdout);
        }
        spinner.stop();
        println!();
    }

    fn print_segment(&self, segment: &Segment, spinner: &mut ThinkingSpinner, stdout: &mut io::Stdout) {
        if let Some(text) = ConsoleFormatter::segment(segment, self.config.show_thinking) {
            spinner.stop();
            let _ = write!(stdout, "{}", text);
            let _ = stdout.flush();
        }
    }
}

/// Ask each question in turn; blank answers and answers that do not fit
/// the parameter's type re-prompt. `None` when the user cancels with
/// Ctrl-C or Ctrl-D.
fn fill_form(rl: &mut DefaultEditor, request: &ParameterRequest) -> Option<Map<String, Value>> {
    let mut collected = Map::new();

    for (name, question) in request.prompts() {
        loop {
            match rl.readline(&format!("  {} ", question)) {
                Ok(answer) if answer.trim().is_empty() => {
                    println!("  {}", "A value is required (Ctrl-C cancels).".yellow());
                }
                Ok(answer) => match request.coerce(name, &answer) {
                    Ok(value) => {
                        collected.insert(name.to_string(), value);
                        break;
                    }
                    Err(e) => println!("  {}", e.to_string().yellow()),
                },
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    debug!(operation = %request.operation_name, "Parameter form cancelled");
                    return None;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(&format!("{:?}", err)));
                    return None;
                }
            }
        }
    }

    Some(collected)
}
