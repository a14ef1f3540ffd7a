//! # deeptrace
//!
//! Multi-agent deep research: a planner proposes web searches for a
//! question, a search agent runs them concurrently, and a writer turns
//! the summaries into a structured markdown report. The run streams a
//! progress log while it works and can be stopped at any checkpoint.
//!
//! ## Modules
//!
//! - [`core`]: research modes, plan and report shapes, confidence scoring
//! - [`research`]: the [`ResearchManager`] state machine and its helpers
//! - [`agent`]: LLM-backed planning, search, writing and email services
//! - [`storage`]: `SQLite` persistence of finished reports
//! - [`cli`]: the `deeptrace` command-line interface
//!
//! ## Example
//!
//! ```rust,ignore
//! use deeptrace::agent::{AgentConfig, PromptSet, research_services};
//! use deeptrace::{ResearchManager, ResearchMode};
//! use tokio_stream::StreamExt;
//!
//! let config = AgentConfig::from_env()?;
//! let services = research_services(&config, &PromptSet::defaults(), None)?;
//! let manager = ResearchManager::new(services);
//!
//! let mut chunks = manager.run("solid-state battery roadmaps", ResearchMode::Deep);
//! while let Some(chunk) = chunks.next().await {
//!     println!("{chunk}");
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod research;
pub mod storage;

pub use crate::core::{ReportData, ResearchMode, SearchPlan, SearchPlanItem};
pub use error::{Error, Result};
pub use research::{ResearchManager, ResearchServices, ResearchSettings, StopHandle};
pub use storage::{ReportStore, SqliteReportStore};
