//! Concurrent search fan-out with completion-ordered collection.
//!
//! [`SearchFanOut::spawn`] launches one task per plan item right away.
//! Each task wraps the search call in [`retry_with_backoff`] and the whole
//! retry sequence in a hard timeout. The caller then drains completions
//! one at a time with [`SearchFanOut::next`], in arrival order, which is
//! what drives per-search progress updates.
//!
//! ```text
//! plan ─┬─ task 0: timeout(retry(search))
//!       ├─ task 1: timeout(retry(search))   ──► join_next() ──► progress
//!       └─ task N: timeout(retry(search))
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::retry::{RetryPolicy, retry_with_backoff};
use super::services::SearchService;
use crate::core::SearchPlan;
use crate::error::ResearchError;

/// Default hard limit for one search item, retries included.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Incremental progress after one search finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    /// Searches finished so far, including this one.
    pub completed: usize,
    /// Searches launched.
    pub total: usize,
    /// Searches that produced a result so far.
    pub successful: usize,
    /// Whether this search produced a result.
    pub success: bool,
}

/// What [`SearchFanOut::next`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutEvent {
    /// One more search finished.
    Progress(SearchProgress),
    /// A stop was requested; every pending task has been aborted and reaped.
    Cancelled,
}

/// In-flight searches for one run.
#[derive(Debug)]
pub struct SearchFanOut {
    tasks: JoinSet<(usize, Option<String>)>,
    total: usize,
    completed: usize,
    results: Vec<String>,
}

impl SearchFanOut {
    /// Spawns one task per item in `plan`. Must be called within a tokio runtime.
    pub fn spawn(
        plan: &SearchPlan,
        searcher: &Arc<dyn SearchService>,
        policy: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        let mut tasks = JoinSet::new();

        for (index, item) in plan.searches.iter().cloned().enumerate() {
            let searcher = Arc::clone(searcher);
            tasks.spawn(async move {
                let attempts = retry_with_backoff("search", &policy, || searcher.search(&item));
                match tokio::time::timeout(timeout, attempts).await {
                    Ok(result) => (index, result),
                    Err(_) => {
                        tracing::warn!(
                            index,
                            query = %item.query,
                            timeout_secs = timeout.as_secs_f64(),
                            "search timed out"
                        );
                        (index, None)
                    }
                }
            });
        }

        tracing::debug!(total = plan.len(), "search tasks launched");

        Self {
            tasks,
            total: plan.len(),
            completed: 0,
            results: Vec::with_capacity(plan.len()),
        }
    }

    /// Waits for the next search to finish or for `stop` to fire.
    ///
    /// Returns `None` once every task has been consumed.
    pub async fn next(&mut self, stop: &CancellationToken) -> Option<FanOutEvent> {
        if self.tasks.is_empty() {
            return None;
        }

        tokio::select! {
            biased;

            () = stop.cancelled() => {
                self.cancel().await;
                Some(FanOutEvent::Cancelled)
            }

            joined = self.tasks.join_next() => {
                let success = match joined? {
                    Ok((_, Some(summary))) => {
                        self.results.push(summary);
                        true
                    }
                    Ok((index, None)) => {
                        tracing::debug!(index, "search produced no result");
                        false
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "search task did not complete");
                        false
                    }
                };
                self.completed += 1;
                Some(FanOutEvent::Progress(SearchProgress {
                    completed: self.completed,
                    total: self.total,
                    successful: self.results.len(),
                    success,
                }))
            }
        }
    }

    /// Aborts every pending task and waits until each one has stopped.
    async fn cancel(&mut self) {
        let pending = self.tasks.len();
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
        tracing::info!(pending, "search fan-out cancelled");
    }

    /// Searches launched.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Results collected so far, in completion order.
    #[must_use]
    pub fn results(&self) -> &[String] {
        &self.results
    }

    /// Consumes the fan-out, failing if nothing succeeded.
    pub fn finish(self) -> Result<Vec<String>, ResearchError> {
        if self.results.is_empty() {
            return Err(ResearchError::AllSearchesFailed {
                attempted: self.total,
            });
        }
        Ok(self.results)
    }
}
