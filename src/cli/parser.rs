//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::sqlite::DEFAULT_LIST_LIMIT;

/// deeptrace: multi-agent deep research from the terminal.
///
/// Plans web searches for a question, runs them concurrently, and
/// writes a structured markdown report with a confidence score.
#[derive(Parser, Debug)]
#[command(name = "deeptrace")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the report database.
    ///
    /// Defaults to `.deeptrace/reports.db` in the current directory.
    #[arg(short, long, env = "DEEPTRACE_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the report database.
    #[command(after_help = r#"Examples:
  deeptrace init                    # Initialize in current directory
  deeptrace init --force            # Re-initialize (destroys saved reports)
  deeptrace --db-path ./r.db init   # Initialize with custom path
"#)]
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Run a research pipeline and print the final report.
    ///
    /// Progress is streamed while the run is in flight. Ctrl-C stops the
    /// run at the next checkpoint.
    #[command(after_help = r#"Examples:
  deeptrace research "state of WebAssembly GC"
  deeptrace research "EU battery regulation" --mode deep
  deeptrace research "vector databases" --no-save --export ./reports
  deeptrace --format json research "rust async runtimes" | jq -r .output
"#)]
    Research {
        /// The research question.
        query: String,

        /// Research mode: quick or deep.
        #[arg(short, long, default_value = "quick")]
        mode: String,

        /// Do not save the finished report to the database.
        #[arg(long)]
        no_save: bool,

        /// Also write the final report as markdown into this directory.
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Directory containing prompt template files.
        #[arg(long, env = "DEEPTRACE_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,
    },

    /// Ask whether a query is specific enough before researching it.
    Clarify {
        /// The query to analyze.
        query: String,

        /// Directory containing prompt template files.
        #[arg(long, env = "DEEPTRACE_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,
    },

    /// Saved report operations (list, show).
    #[command(subcommand)]
    Reports(ReportCommands),

    /// Write the default prompt templates to a directory.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (default: `~/.config/deeptrace/prompts`).
        dir: Option<PathBuf>,
    },
}

/// Saved report subcommands.
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// List saved reports, newest first.
    List {
        /// Maximum number of reports to show.
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Show one saved report.
    Show {
        /// Report ID or a unique prefix of it.
        id: String,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }

    /// Log filter directive implied by `-v`, used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
