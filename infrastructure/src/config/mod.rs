//! Configuration file loading for kubex
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `KUBEX_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./kubex.toml` or `./.kubex.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/kubex/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigWarning, FileApiConfig, FileConfig, FileLlmConfig, FileLoggingConfig, FileMemoryConfig,
    FileReplConfig, FileRoutingConfig,
};
pub use loader::ConfigLoader;
