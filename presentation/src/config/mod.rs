//! Presentation-level configuration
//!
//! Configuration for REPL behavior and stream rendering.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show a spinner while waiting for the first chunk
    pub show_progress: bool,
    /// Path to history file (platform data directory when unset)
    pub history_file: Option<PathBuf>,
    /// Dim `<think>` blocks instead of hiding them
    pub show_thinking: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            show_thinking: false,
        }
    }
}

impl ReplConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("kubex").join("history.txt")))
    }
}
