//! CLI layer for deeptrace.
//!
//! Provides the command-line interface using clap, with commands for
//! running research, checking queries and browsing saved reports.

pub mod commands;
pub mod export;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ReportCommands};
