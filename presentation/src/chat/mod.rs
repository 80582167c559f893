//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface over the router,
//! including the form that collects missing operation parameters.

mod command;
mod repl;

pub use command::Command;
pub use repl::ChatRepl;
