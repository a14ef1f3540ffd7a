//! Capability traits for the external collaborators of a research run.
//!
//! The orchestrator only sees these four interfaces. Concrete
//! implementations (hosted LLM agents, mail delivery) are injected through
//! [`ResearchServices`], which keeps provider choice out of the control
//! flow and lets tests substitute in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{ReportData, ResearchMode, SearchPlan, SearchPlanItem};
use crate::error::AgentError;
use crate::storage::ReportStore;

/// Produces a search plan for a research question.
#[async_trait]
pub trait PlanningService: Send + Sync {
    /// Plans the searches for `query` within the budget of `mode`.
    async fn plan(&self, query: &str, mode: ResearchMode) -> Result<SearchPlan, AgentError>;
}

/// Runs a single web search and summarizes what it found.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Searches for `item.query` and returns a text summary.
    async fn search(&self, item: &SearchPlanItem) -> Result<String, AgentError>;
}

/// Synthesizes a structured report from search summaries.
#[async_trait]
pub trait WritingService: Send + Sync {
    /// Writes the report for `query` from the collected `results`.
    async fn write(&self, query: &str, results: &[String]) -> Result<ReportData, AgentError>;
}

/// Delivers a finished report.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends `markdown` to the configured recipients.
    async fn send(&self, markdown: &str) -> Result<(), AgentError>;
}

/// The set of collaborators a [`ResearchManager`](super::ResearchManager) drives.
///
/// `email` and `store` are optional: without them the corresponding
/// phases are skipped rather than failed.
#[derive(Clone)]
pub struct ResearchServices {
    /// Planning agent.
    pub planner: Arc<dyn PlanningService>,
    /// Search agent.
    pub searcher: Arc<dyn SearchService>,
    /// Writing agent.
    pub writer: Arc<dyn WritingService>,
    /// Email agent, present only when delivery is configured.
    pub email: Option<Arc<dyn EmailService>>,
    /// Report store, absent when persistence is disabled.
    pub store: Option<Arc<dyn ReportStore>>,
}

impl ResearchServices {
    /// Bundles the three mandatory services with no email or storage.
    #[must_use]
    pub fn new(
        planner: Arc<dyn PlanningService>,
        searcher: Arc<dyn SearchService>,
        writer: Arc<dyn WritingService>,
    ) -> Self {
        Self {
            planner,
            searcher,
            writer,
            email: None,
            store: None,
        }
    }

    /// Enables the email phase.
    #[must_use]
    pub fn with_email(mut self, email: Arc<dyn EmailService>) -> Self {
        self.email = Some(email);
        self
    }

    /// Enables persistence.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = Some(store);
        self
    }
}

impl std::fmt::Debug for ResearchServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchServices")
            .field("planner", &"<dyn PlanningService>")
            .field("searcher", &"<dyn SearchService>")
            .field("writer", &"<dyn WritingService>")
            .field("email", &self.email.as_ref().map(|_| "<dyn EmailService>"))
            .field("store", &self.store.as_ref().map(|_| "<dyn ReportStore>"))
            .finish()
    }
}
