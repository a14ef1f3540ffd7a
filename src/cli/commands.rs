//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

#![allow(clippy::format_push_string)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_stream::StreamExt;

use crate::agent::client::{clarifier, research_services};
use crate::agent::config::{AgentConfig, EmailConfig};
use crate::agent::prompt::PromptSet;
use crate::cli::export::export_report;
use crate::cli::output::{OutputFormat, format_clarification, format_report, format_report_list};
use crate::cli::parser::{Cli, Commands, ReportCommands};
use crate::core::ResearchMode;
use crate::error::{CommandError, Result, StorageError};
use crate::research::{ResearchManager, ResearchSettings};
use crate::storage::{SqliteReportStore, StoredReport};

/// Parameters for the research command.
#[derive(Debug, Clone)]
pub struct ResearchParams<'a> {
    /// The research question.
    pub query: &'a str,
    /// Mode name, parsed into a [`ResearchMode`].
    pub mode: &'a str,
    /// Skip saving the report.
    pub no_save: bool,
    /// Directory to export the final markdown into.
    pub export: Option<&'a Path>,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<&'a Path>,
}

/// Executes the CLI command.
///
/// Commands that stream progress (only `research`) write it to `out` as
/// it arrives; every command returns its final output as a string.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Research {
            query,
            mode,
            no_save,
            export,
            prompt_dir,
        } => {
            let params = ResearchParams {
                query,
                mode,
                no_save: *no_save,
                export: export.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
            };
            cmd_research(&db_path, &params, format, out)
        }
        Commands::Clarify { query, prompt_dir } => {
            cmd_clarify(query, prompt_dir.as_deref(), format)
        }
        Commands::Reports(sub) => match sub {
            ReportCommands::List { limit } => cmd_reports_list(&db_path, *limit, format),
            ReportCommands::Show { id } => cmd_reports_show(&db_path, id, format),
        },
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

/// Opens an existing, initialized store.
fn open_storage(db_path: &Path) -> Result<SqliteReportStore> {
    let store = SqliteReportStore::open(db_path)?;

    if !store.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(store)
}

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let store = SqliteReportStore::open(db_path)?;
    store.init()?;

    match format {
        OutputFormat::Text => Ok(format!(
            "Initialized report database at: {}\n",
            db_path.display()
        )),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "success": true,
                "path": db_path.to_string_lossy(),
                "force": force
            });
            Ok(format.to_json(&json))
        }
    }
}

fn agent_config(prompt_dir: Option<&Path>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(dir) = prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    builder.build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

/// Prints the part of each progress chunk not yet shown.
///
/// Status chunks are full renderings that only ever grow, so the new
/// text is whatever follows the previous chunk.
struct ProgressPrinter {
    shown: String,
    enabled: bool,
}

impl ProgressPrinter {
    const fn new(enabled: bool) -> Self {
        Self {
            shown: String::new(),
            enabled,
        }
    }

    /// Returns `true` if `chunk` extends what is already on screen.
    fn continues(&self, chunk: &str) -> bool {
        !self.shown.is_empty() && chunk.starts_with(&self.shown)
    }

    fn show(&mut self, chunk: String, out: &mut dyn Write) -> Result<()> {
        if self.enabled {
            let delta = chunk.strip_prefix(self.shown.as_str()).unwrap_or(&chunk);
            out.write_all(delta.as_bytes())?;
            out.flush()?;
        }
        self.shown = chunk;
        Ok(())
    }

    fn finish(&self, out: &mut dyn Write) -> Result<()> {
        if self.enabled && !self.shown.is_empty() {
            out.write_all(b"\n\n")?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Shows every chunk but the last as progress and returns the last one.
async fn stream_progress(
    mut chunks: impl tokio_stream::Stream<Item = String> + Unpin,
    progress: &mut ProgressPrinter,
    out: &mut dyn Write,
) -> Result<Option<String>> {
    let mut last: Option<String> = None;
    while let Some(chunk) = chunks.next().await {
        if let Some(previous) = last.replace(chunk) {
            progress.show(previous, out)?;
        }
    }
    Ok(last)
}

fn cmd_research(
    db_path: &Path,
    params: &ResearchParams<'_>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<String> {
    let mode: ResearchMode = params.mode.parse().map_err(CommandError::InvalidArgument)?;
    if params.query.trim().is_empty() {
        return Err(CommandError::InvalidArgument("query must not be empty".to_string()).into());
    }

    let config = agent_config(params.prompt_dir)?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let mut services = research_services(&config, &prompts, EmailConfig::from_env())?;

    if !params.no_save {
        match SqliteReportStore::open(db_path).and_then(|store| store.init().map(|()| store)) {
            Ok(store) => services = services.with_store(Arc::new(store)),
            Err(e) => tracing::warn!(
                error = %e,
                path = %db_path.display(),
                "report database unavailable; the report will not be saved"
            ),
        }
    }

    let manager = ResearchManager::new(services)
        .with_settings(ResearchSettings::default().with_search_timeout(config.search_timeout));

    let rt = runtime()?;
    let mut progress = ProgressPrinter::new(format == OutputFormat::Text);

    let last = rt.block_on(async {
        let stop = manager.stop_handle();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping at the next checkpoint");
                stop.request_stop();
            }
        });

        let chunks = manager.run(params.query, mode);
        let streamed = stream_progress(chunks, &mut progress, out).await;
        interrupt.abort();
        streamed
    })?;

    // A final chunk that extends the progress log is the stop notice,
    // not a document.
    let (report, stopped) = match last {
        Some(chunk) if progress.continues(&chunk) => {
            progress.show(chunk, out)?;
            (None, true)
        }
        Some(chunk) => (Some(chunk), false),
        None => (None, false),
    };
    progress.finish(out)?;

    let exported = match (params.export, &report) {
        (Some(dir), Some(markdown)) => Some(export_report(dir, params.query, markdown)?),
        _ => None,
    };

    match format {
        OutputFormat::Text => {
            let mut output = report.unwrap_or_default();
            if let Some(path) = &exported {
                output.push_str(&format!("\n\nReport exported to: {}", path.display()));
            }
            if !output.is_empty() {
                output.push('\n');
            }
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "query": params.query,
                "mode": mode,
                "stopped": stopped,
                "output": report.unwrap_or_else(|| progress.shown.clone()),
                "exported": exported.as_ref().map(|p| p.to_string_lossy()),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_clarify(query: &str, prompt_dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let config = agent_config(prompt_dir)?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let agent = clarifier(&config, &prompts)?;

    let verdict = runtime()?.block_on(agent.clarify(query))?;
    Ok(format_clarification(query, &verdict, format))
}

fn cmd_reports_list(db_path: &Path, limit: usize, format: OutputFormat) -> Result<String> {
    let store = open_storage(db_path)?;
    let reports = store.list_reports(limit)?;
    Ok(format_report_list(&reports, format))
}

/// Resolves a full ID or a unique ID prefix to a saved report.
fn resolve_report(store: &SqliteReportStore, id: &str) -> Result<StoredReport> {
    if let Some(report) = store.get_report(id)? {
        return Ok(report);
    }

    let mut matches = store.find_by_prefix(id, 2)?;
    match matches.len() {
        0 => Err(StorageError::ReportNotFound { id: id.to_string() }.into()),
        1 => Ok(matches.remove(0)),
        _ => Err(CommandError::InvalidArgument(format!(
            "report ID prefix '{id}' is ambiguous; use more characters"
        ))
        .into()),
    }
}

fn cmd_reports_show(db_path: &Path, id: &str, format: OutputFormat) -> Result<String> {
    let store = open_storage(db_path)?;
    let report = resolve_report(&store, id)?;
    Ok(format_report(&report, format))
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str(&format!(
                    "  {}\n",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                ));
            }
            output.push_str("\nEdit these files to customize agent system prompts.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect::<Vec<_>>(),
            });
            Ok(format.to_json(&json))
        }
    }
}
