//! Error types for deeptrace.
//!
//! Each layer gets its own enum: [`AgentError`] for calls to hosted
//! language models and mail delivery, [`StorageError`] for the report
//! store, [`ResearchError`] for pipeline phase failures and
//! [`CommandError`] for the CLI. [`Error`] wraps all of them.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent or provider failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Report storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Research pipeline failure.
    #[error(transparent)]
    Research(#[from] ResearchError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by external agent calls.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key configured.
    #[error("API key not configured: set OPENAI_API_KEY or DEEPTRACE_API_KEY")]
    ApiKeyMissing,

    /// Provider name not recognised by the factory.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The requested provider name.
        name: String,
    },

    /// The provider request failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error description.
        message: String,
        /// HTTP status code, when known.
        status: Option<u16>,
    },

    /// The model replied with something we could not use.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// Parse failure description.
        message: String,
        /// Raw response content.
        content: String,
    },

    /// Mail delivery was rejected or could not be attempted.
    #[error("email delivery failed: {message}")]
    Delivery {
        /// Failure description.
        message: String,
        /// HTTP status code returned by the mail API, when known.
        status: Option<u16>,
    },
}

impl AgentError {
    /// Short variant name used in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ApiKeyMissing => "ApiKeyMissing",
            Self::UnsupportedProvider { .. } => "UnsupportedProvider",
            Self::ApiRequest { .. } => "ApiRequest",
            Self::ResponseParse { .. } => "ResponseParse",
            Self::Delivery { .. } => "Delivery",
        }
    }
}

/// Errors raised by the report store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `SQLite` failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The schema has not been created yet.
    #[error("database not initialized; run `deeptrace init` first")]
    NotInitialized,

    /// The record violates a store constraint.
    #[error("invalid report record: {message}")]
    InvalidRecord {
        /// What was wrong with the record.
        message: String,
    },

    /// No report matched the given identifier.
    #[error("report not found: {id}")]
    ReportNotFound {
        /// The identifier or prefix that was looked up.
        id: String,
    },

    /// A blocking storage task could not be joined.
    #[error("storage task failed: {message}")]
    Task {
        /// Join failure description.
        message: String,
    },

    /// Filesystem failure around the database file.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Short variant name used in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "Database",
            Self::NotInitialized => "NotInitialized",
            Self::InvalidRecord { .. } => "InvalidRecord",
            Self::ReportNotFound { .. } => "ReportNotFound",
            Self::Task { .. } => "Task",
            Self::Io(_) => "Io",
        }
    }
}

/// Terminal failures of a research run.
///
/// The `Display` text is the message embedded in the synthesized error
/// report, so it is user facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResearchError {
    /// The planner produced nothing after all retries.
    #[error("Failed to plan research searches")]
    PlanningFailed,

    /// Not a single search item succeeded.
    #[error("All search attempts failed")]
    AllSearchesFailed {
        /// Number of items that were attempted.
        attempted: usize,
    },

    /// The writer produced nothing after all retries.
    #[error("Failed to generate structured report")]
    WritingFailed,

    /// Something outside the phase failure policy went wrong.
    #[error("Unexpected system error: {kind}")]
    Unexpected {
        /// Name of the fault, e.g. `panic`.
        kind: String,
    },
}

impl ResearchError {
    /// One-line progress log entry for this failure.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self {
            Self::PlanningFailed => "Planning failed after retries".to_string(),
            Self::AllSearchesFailed { attempted } => {
                format!("All {attempted} searches failed")
            }
            Self::WritingFailed => "Report generation failed after retries".to_string(),
            Self::Unexpected { kind } => format!("Unexpected error occurred: {kind}"),
        }
    }
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Generic command failure.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Invalid argument value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output serialization failed.
    #[error("output format error: {0}")]
    OutputFormat(String),
}
