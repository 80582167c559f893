//! Presentation layer for kubex
//!
//! This crate contains the CLI definition, the interactive chat REPL,
//! console formatting and progress indicators.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use output::think::{Segment, ThinkFilter};
pub use progress::spinner::ThinkingSpinner;
