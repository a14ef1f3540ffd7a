//! Wall-clock timing of pipeline phases against the mode's target.

use std::time::Duration;

use tokio::time::Instant;

/// Phases whose duration is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedPhase {
    /// Search planning.
    Planning,
    /// Search fan-out.
    Searching,
    /// Report writing.
    Writing,
}

impl TrackedPhase {
    const fn index(self) -> usize {
        match self {
            Self::Planning => 0,
            Self::Searching => 1,
            Self::Writing => 2,
        }
    }

    /// Lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Writing => "writing",
        }
    }
}

/// Timing snapshot of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceSummary {
    /// Time since the tracker was created.
    pub total: Duration,
    /// Planning duration, if the phase finished.
    pub planning: Option<Duration>,
    /// Searching duration, if the phase finished.
    pub searching: Option<Duration>,
    /// Writing duration, if the phase finished.
    pub writing: Option<Duration>,
    /// The mode's target time.
    pub target: Duration,
    /// Whether `total` overran `target`.
    pub exceeded: bool,
}

/// Records phase durations for one run.
#[derive(Debug)]
pub struct PerformanceTracker {
    started: Instant,
    target: Duration,
    open: [Option<Instant>; 3],
    closed: [Option<Duration>; 3],
}

impl PerformanceTracker {
    /// Starts the clock for a run with the given target.
    #[must_use]
    pub fn new(target: Duration) -> Self {
        Self {
            started: Instant::now(),
            target,
            open: [None; 3],
            closed: [None; 3],
        }
    }

    /// Marks the start of `phase`.
    pub fn start_phase(&mut self, phase: TrackedPhase) {
        self.open[phase.index()] = Some(Instant::now());
    }

    /// Marks the end of `phase` and returns its duration.
    ///
    /// Returns `None` if the phase was never started.
    pub fn end_phase(&mut self, phase: TrackedPhase) -> Option<Duration> {
        let elapsed = self.open[phase.index()].take()?.elapsed();
        self.closed[phase.index()] = Some(elapsed);
        tracing::debug!(
            phase = phase.as_str(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "phase finished"
        );
        Some(elapsed)
    }

    /// Time since the run started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Snapshot of all timings.
    #[must_use]
    pub fn summary(&self) -> PerformanceSummary {
        let total = self.elapsed();
        PerformanceSummary {
            total,
            planning: self.closed[TrackedPhase::Planning.index()],
            searching: self.closed[TrackedPhase::Searching.index()],
            writing: self.closed[TrackedPhase::Writing.index()],
            target: self.target,
            exceeded: total > self.target,
        }
    }

    /// Logs the summary, warning on overrun, and returns it.
    pub fn report(&self) -> PerformanceSummary {
        let summary = self.summary();
        let to_ms = |d: Option<Duration>| d.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        if summary.exceeded {
            tracing::warn!(
                total_secs = summary.total.as_secs_f64(),
                target_secs = summary.target.as_secs(),
                "run exceeded target time"
            );
        }
        tracing::info!(
            total_secs = summary.total.as_secs_f64(),
            planning_ms = ?to_ms(summary.planning),
            searching_ms = ?to_ms(summary.searching),
            writing_ms = ?to_ms(summary.writing),
            "run timing"
        );
        summary
    }
}
