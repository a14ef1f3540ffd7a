//! The research state machine.
//!
//! A run moves strictly forward through
//!
//! ```text
//! STARTING → PLANNING → SEARCHING → WRITING → SCORING → PERSISTING → EMAILING → DONE
//! ```
//!
//! and may end early in `CANCELLED` (stop requested at a checkpoint) or
//! `FAILED` (a phase produced nothing usable). Every transition pushes the
//! full progress log onto the output stream; the last chunk is always
//! renderable markdown: the report on `DONE`, the synthesized error report
//! on `FAILED`, the progress log with a stop notice on `CANCELLED`.
//!
//! The pipeline runs inside a supervising task, so even a panicking
//! collaborator surfaces as a `FAILED` error report instead of a fault in
//! the caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use super::executor::{DEFAULT_SEARCH_TIMEOUT, FanOutEvent, SearchFanOut};
use super::fallback::build_error_report;
use super::persistence::save_report_safely;
use super::retry::{RetryPolicy, retry_with_backoff};
use super::services::ResearchServices;
use super::status::StatusReporter;
use super::stop::StopHandle;
use super::tracker::{PerformanceTracker, TrackedPhase};
use crate::core::{ResearchMode, calculate_confidence, get_mode_config};
use crate::error::ResearchError;

/// Default buffer of the output stream.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// States of a research run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Run accepted, nothing done yet.
    Starting,
    /// Asking the planner for searches.
    Planning,
    /// Fan-out of the planned searches.
    Searching,
    /// Asking the writer for a report.
    Writing,
    /// Recomputing the confidence score.
    Scoring,
    /// Saving the report.
    Persisting,
    /// Mailing the report.
    Emailing,
    /// Finished with a report.
    Done,
    /// Stopped on request.
    Cancelled,
    /// Finished with an error report.
    Failed,
}

impl RunPhase {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Writing => "writing",
            Self::Scoring => "scoring",
            Self::Persisting => "persisting",
            Self::Emailing => "emailing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for `Done`, `Cancelled` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables of a [`ResearchManager`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResearchSettings {
    /// Hard limit per search item, retries included.
    pub search_timeout: Duration,
    /// Retry budget of the planner call.
    pub planning_retry: RetryPolicy,
    /// Retry budget of each search call.
    pub search_retry: RetryPolicy,
    /// Retry budget of the writer call.
    pub writing_retry: RetryPolicy,
    /// Buffer of the output stream.
    pub channel_capacity: usize,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            planning_retry: RetryPolicy::PLANNING,
            search_retry: RetryPolicy::SEARCH,
            writing_retry: RetryPolicy::WRITING,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ResearchSettings {
    /// Overrides the per-search timeout.
    #[must_use]
    pub const fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }
}

/// Drives research runs over a set of injected services.
///
/// One run at a time per manager; the stop flag is reset when a run starts.
#[derive(Debug)]
pub struct ResearchManager {
    services: ResearchServices,
    settings: ResearchSettings,
    stop: StopHandle,
}

impl ResearchManager {
    /// Creates a manager with default settings.
    #[must_use]
    pub fn new(services: ResearchServices) -> Self {
        Self {
            services,
            settings: ResearchSettings::default(),
            stop: StopHandle::new(),
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: ResearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    /// Starts a run and returns its output stream.
    ///
    /// Each chunk is either a full progress log or, last, the final
    /// markdown document. The stream ends once the run is terminal.
    /// Dropping it stops the run at the next checkpoint.
    ///
    /// The run is spawned on the current tokio runtime. Called outside
    /// one, the stream carries a single error report and nothing runs.
    pub fn run(&self, query: impl Into<String>, mode: ResearchMode) -> ReceiverStream<String> {
        let query = query.into();
        let token = self.stop.reset();
        let run_id = uuid::Uuid::new_v4().to_string();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(run_id = %run_id, error_kind = "no_runtime", "research run needs a tokio runtime");
            let error = ResearchError::Unexpected {
                kind: "no_runtime".to_string(),
            };
            let report = build_error_report::<&str>(&query, &error.to_string(), &[]);
            let (tx, rx) = mpsc::channel(1);
            let _ = tx.try_send(report.markdown_report);
            return ReceiverStream::new(rx);
        };

        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));

        tracing::info!(run_id = %run_id, mode = %mode, query = %query, "research run started");

        let pipeline = Pipeline {
            query: query.clone(),
            mode,
            services: self.services.clone(),
            settings: self.settings,
            token,
            tx: tx.clone(),
            status: StatusReporter::new(mode, &run_id),
            phase: RunPhase::Starting,
        };

        runtime.spawn(async move {
            let Err(e) = tokio::spawn(pipeline.run()).await else {
                return;
            };
            let kind = if e.is_panic() { "panic" } else { "cancelled" };
            tracing::error!(run_id = %run_id, error_kind = kind, error = %e, "research run aborted");

            let error = ResearchError::Unexpected {
                kind: kind.to_string(),
            };
            let mut status = StatusReporter::new(mode, &run_id);
            status.add_error(&error.status_line());
            let report = build_error_report::<&str>(&query, &error.to_string(), &[]);
            if tx.send(status.get_current_status()).await.is_ok() {
                let _ = tx.send(report.markdown_report).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Asks the current run to stop at its next checkpoint. Idempotent.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Returns `true` once a stop was requested for the current run.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// A handle that can stop runs of this manager from elsewhere.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

/// Why a run left the happy path.
enum Halt {
    Cancelled,
    Failed(ResearchError, Vec<String>),
}

/// State owned by one spawned run.
struct Pipeline {
    query: String,
    mode: ResearchMode,
    services: ResearchServices,
    settings: ResearchSettings,
    token: CancellationToken,
    tx: mpsc::Sender<String>,
    status: StatusReporter,
    phase: RunPhase,
}

impl Pipeline {
    async fn run(mut self) {
        let config = get_mode_config(self.mode);
        let mut tracker = PerformanceTracker::new(config.target_time);

        match self.execute(&mut tracker).await {
            Ok(()) => {}
            Err(Halt::Cancelled) => {
                self.enter(RunPhase::Cancelled);
                self.status.add_stopped_by_user();
                self.emit_status().await;
            }
            Err(Halt::Failed(error, partial)) => {
                self.enter(RunPhase::Failed);
                tracing::error!(error = %error, partial_results = partial.len(), "research run failed");
                self.status.add_error(&error.status_line());
                self.emit_status().await;
                let report = build_error_report(&self.query, &error.to_string(), &partial);
                self.emit(report.markdown_report).await;
            }
        }

        tracker.report();
    }

    async fn execute(&mut self, tracker: &mut PerformanceTracker) -> Result<(), Halt> {
        self.status.add_starting();
        self.emit_status().await;

        // planning
        self.checkpoint()?;
        self.enter(RunPhase::Planning);
        self.status.add_planning_start();
        self.emit_status().await;

        tracker.start_phase(TrackedPhase::Planning);
        let planner = Arc::clone(&self.services.planner);
        let (query, mode) = (self.query.clone(), self.mode);
        let plan = retry_with_backoff("planning", &self.settings.planning_retry, || {
            planner.plan(&query, mode)
        })
        .await;
        tracker.end_phase(TrackedPhase::Planning);

        let Some(plan) = plan else {
            return Err(Halt::Failed(ResearchError::PlanningFailed, Vec::new()));
        };
        let plan = plan.clamp_to(self.mode);
        self.status.add_planning_complete(&plan);
        self.emit_status().await;

        // searching
        self.checkpoint()?;
        self.enter(RunPhase::Searching);
        self.status.add_search_start();
        self.emit_status().await;

        tracker.start_phase(TrackedPhase::Searching);
        let mut fan_out = SearchFanOut::spawn(
            &plan,
            &self.services.searcher,
            self.settings.search_retry,
            self.settings.search_timeout,
        );
        let token = self.token.clone();
        while let Some(event) = fan_out.next(&token).await {
            match event {
                FanOutEvent::Progress(p) => {
                    self.status
                        .add_search_progress(p.completed, p.total, p.successful, p.success);
                    self.emit_status().await;
                }
                FanOutEvent::Cancelled => {
                    tracker.end_phase(TrackedPhase::Searching);
                    return Err(Halt::Cancelled);
                }
            }
        }
        tracker.end_phase(TrackedPhase::Searching);

        let total = fan_out.total();
        let results = fan_out.finish().map_err(|e| Halt::Failed(e, Vec::new()))?;
        self.status.add_search_complete(results.len(), total);
        self.emit_status().await;

        // writing
        self.checkpoint()?;
        self.enter(RunPhase::Writing);
        self.status.add_writing_start();
        self.emit_status().await;

        tracker.start_phase(TrackedPhase::Writing);
        let writer = Arc::clone(&self.services.writer);
        let written = retry_with_backoff("writing", &self.settings.writing_retry, || {
            writer.write(&query, &results)
        })
        .await;
        tracker.end_phase(TrackedPhase::Writing);

        let Some(mut report) = written else {
            return Err(Halt::Failed(ResearchError::WritingFailed, results));
        };

        // scoring
        self.enter(RunPhase::Scoring);
        let reported = report.confidence_score;
        report.set_confidence(calculate_confidence(results.len(), &results));
        tracing::debug!(
            writer_confidence = reported,
            confidence = report.confidence_score,
            sources = results.len(),
            "confidence recomputed"
        );
        self.status.add_writing_complete(report.confidence_score);
        self.emit_status().await;

        // persisting
        self.checkpoint()?;
        self.enter(RunPhase::Persisting);
        if let Some(store) = self.services.store.clone() {
            self.status.add_saving();
            self.emit_status().await;
            match save_report_safely(&store, &self.query, self.mode, &report).await {
                Some(id) => self.status.add_saved(&id),
                None => self.status.add_save_failed("see logs for details"),
            }
        } else {
            self.status.add_save_skipped();
        }
        self.emit_status().await;

        // emailing
        self.checkpoint()?;
        self.enter(RunPhase::Emailing);
        if let Some(email) = self.services.email.clone() {
            self.status.add_email_sending();
            self.emit_status().await;
            let sent = match email.send(&report.markdown_report).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error_kind = e.kind(), error = %e, "email delivery failed");
                    false
                }
            };
            self.status.add_email_result(sent);
            self.emit_status().await;
        } else {
            tracing::debug!("email not configured, skipping delivery");
        }

        self.enter(RunPhase::Done);
        self.status
            .add_completion(tracker.elapsed(), get_mode_config(self.mode).target_time);
        self.emit_status().await;
        self.emit(report.markdown_report).await;
        Ok(())
    }

    fn enter(&mut self, phase: RunPhase) {
        tracing::debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }

    fn checkpoint(&self) -> Result<(), Halt> {
        if self.token.is_cancelled() {
            tracing::info!(phase = %self.phase, "stop observed at checkpoint");
            return Err(Halt::Cancelled);
        }
        Ok(())
    }

    async fn emit_status(&self) {
        self.emit(self.status.get_current_status()).await;
    }

    /// Sends a chunk. A closed stream means nobody is listening, which
    /// stops the run like an explicit request would.
    async fn emit(&self, chunk: String) {
        if self.tx.send(chunk).await.is_err() && !self.token.is_cancelled() {
            tracing::info!(phase = %self.phase, "output stream closed, stopping run");
            self.token.cancel();
        }
    }
}
