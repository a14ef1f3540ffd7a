//! deeptrace command-line entry point.

use std::io::Write;

use clap::Parser;
use deeptrace::cli::{Cli, execute};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let output = execute(&cli, &mut out)?;
    if !output.is_empty() {
        write!(out, "{output}")?;
        out.flush()?;
    }
    Ok(())
}
