//! Research pipeline orchestration.
//!
//! [`ResearchManager`] runs a query through planning, a concurrent search
//! fan-out, report writing, scoring, persistence and delivery, streaming
//! progress as it goes. Collaborators are injected as [`ResearchServices`].
//!
//! # Example
//!
//! ```rust,ignore
//! use deeptrace::research::{ResearchManager, ResearchServices};
//! use deeptrace::ResearchMode;
//! use tokio_stream::StreamExt;
//!
//! let manager = ResearchManager::new(services);
//! let mut chunks = manager.run("state of WebAssembly GC", ResearchMode::Quick);
//! while let Some(chunk) = chunks.next().await {
//!     render(&chunk);
//! }
//! ```

pub mod executor;
pub mod fallback;
pub mod orchestrator;
pub mod persistence;
pub mod retry;
pub mod services;
pub mod status;
pub mod stop;
pub mod tracker;

pub use executor::{DEFAULT_SEARCH_TIMEOUT, FanOutEvent, SearchFanOut, SearchProgress};
pub use fallback::build_error_report;
pub use orchestrator::{ResearchManager, ResearchSettings, RunPhase};
pub use persistence::save_report_safely;
pub use retry::{RetryPolicy, retry_with_backoff};
pub use services::{
    EmailService, PlanningService, ResearchServices, SearchService, WritingService,
};
pub use status::StatusReporter;
pub use stop::StopHandle;
pub use tracker::{PerformanceSummary, PerformanceTracker, TrackedPhase};
