//! Human-readable progress log for a streaming front-end.
//!
//! The reporter is append-only. Every update the orchestrator emits is
//! the full rendering from [`StatusReporter::get_current_status`], so a
//! consumer can simply replace what it displays with the latest chunk.

use std::fmt::Write;
use std::time::Duration;

use crate::core::{ConfidenceLabel, ResearchMode, SearchPlan};

/// Accumulates progress lines for one run.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    header: String,
    lines: Vec<String>,
}

impl StatusReporter {
    /// Creates a reporter for a run in `mode` identified by `run_id`.
    #[must_use]
    pub fn new(mode: ResearchMode, run_id: &str) -> Self {
        let header = format!(
            "# 🔬 Deep Research - {} Mode\n\n**Run ID:** `{run_id}`\n\n---\n\n## 📊 Progress Log\n\n",
            mode.label()
        );
        Self {
            header,
            lines: Vec::new(),
        }
    }

    /// Appends a raw line.
    pub fn add(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Number of log lines so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Header followed by every log line, newline separated.
    #[must_use]
    pub fn get_current_status(&self) -> String {
        let mut out = self.header.clone();
        out.push_str(&self.lines.join("\n"));
        out
    }

    /// The run has begun.
    pub fn add_starting(&mut self) {
        self.add("🚀 **Starting research...**");
    }

    /// Planning has begun.
    pub fn add_planning_start(&mut self) {
        self.add("🧠 **Planning searches...**");
    }

    /// Planning finished; lists the plan.
    pub fn add_planning_complete(&mut self, plan: &SearchPlan) {
        self.add(format!(
            "✅ **Planning complete** - {} searches planned",
            plan.len()
        ));
        let mut listing = String::from("\n### 📋 Search Plan:\n");
        for (i, item) in plan.searches.iter().enumerate() {
            let _ = write!(listing, "\n**{}. {}**\n", i + 1, item.query);
            if !item.reason.is_empty() {
                let _ = writeln!(listing, "   *Reason:* {}", item.reason);
            }
        }
        self.add(listing);
    }

    /// The fan-out is starting.
    pub fn add_search_start(&mut self) {
        self.add("🔍 **Starting searches...**");
    }

    /// One search finished.
    pub fn add_search_progress(
        &mut self,
        completed: usize,
        total: usize,
        successful: usize,
        success: bool,
    ) {
        if success {
            self.add(format!(
                "   ✓ Search {completed}/{total} completed - {successful} successful so far"
            ));
        } else {
            self.add(format!("   ✗ Search {completed}/{total} failed"));
        }
    }

    /// The fan-out finished.
    pub fn add_search_complete(&mut self, successful: usize, total: usize) {
        self.add(format!(
            "✅ **Searches complete** - {successful}/{total} successful"
        ));
    }

    /// Writing has begun.
    pub fn add_writing_start(&mut self) {
        self.add("✍️ **Writing comprehensive report...**");
    }

    /// The report was written and scored.
    pub fn add_writing_complete(&mut self, confidence: f64) {
        self.add(format!(
            "✅ **Report complete** - Confidence: {} ({confidence:.2})",
            ConfidenceLabel::from_score(confidence)
        ));
    }

    /// Persistence has begun.
    pub fn add_saving(&mut self) {
        self.add("💾 **Saving to database...**");
    }

    /// Persistence succeeded.
    pub fn add_saved(&mut self, report_id: &str) {
        let short: String = report_id.chars().take(8).collect();
        self.add(format!("✅ **Saved to database** - Report ID: {short}..."));
    }

    /// Persistence failed; the run continues.
    pub fn add_save_failed(&mut self, reason: &str) {
        self.add(format!("⚠️ **Database save failed** - {reason}"));
        self.add("   *(Report still available but not persisted)*");
    }

    /// No store is configured.
    pub fn add_save_skipped(&mut self) {
        self.add("ℹ️ Report not persisted (storage disabled)");
    }

    /// Email delivery has begun.
    pub fn add_email_sending(&mut self) {
        self.add("📧 **Sending email...**");
    }

    /// Email delivery outcome.
    pub fn add_email_result(&mut self, success: bool) {
        if success {
            self.add("✅ **Email sent successfully**");
        } else {
            self.add("⚠️ **Email failed** (check configuration)");
        }
    }

    /// The run finished normally.
    pub fn add_completion(&mut self, elapsed: Duration, target: Duration) {
        self.add("\n---\n\n## ✨ Research Complete!");
        self.add(format!(
            "*Finished in {:.1}s (target {}s)*",
            elapsed.as_secs_f64(),
            target.as_secs()
        ));
    }

    /// The run was stopped by the user.
    pub fn add_stopped_by_user(&mut self) {
        self.add("\n---\n\n## ⚠️ Research Stopped by User");
        self.add("Partial results shown above (if any). Results not saved to database.");
    }

    /// The run hit a terminal failure.
    pub fn add_error(&mut self, message: &str) {
        self.add(format!("❌ **{message}**"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SearchPlanItem;

    #[test]
    fn test_header_and_lines() {
        let mut reporter = StatusReporter::new(ResearchMode::Deep, "abc");
        assert!(reporter.is_empty());
        reporter.add_starting();
        reporter.add_planning_start();

        let status = reporter.get_current_status();
        assert!(status.starts_with("# 🔬 Deep Research - DEEP Mode"));
        assert!(status.contains("`abc`"));
        assert!(status.ends_with("🚀 **Starting research...**\n🧠 **Planning searches...**"));
        assert_eq!(reporter.len(), 2);
    }

    #[test]
    fn test_plan_listing() {
        let mut reporter = StatusReporter::new(ResearchMode::Quick, "id");
        let plan = SearchPlan::new(vec![
            SearchPlanItem::new("rust async", "background"),
            SearchPlanItem::new("tokio joinset", ""),
        ]);
        reporter.add_planning_complete(&plan);
        let status = reporter.get_current_status();
        assert!(status.contains("2 searches planned"));
        assert!(status.contains("**1. rust async**"));
        assert!(status.contains("*Reason:* background"));
        assert!(status.contains("**2. tokio joinset**"));
    }

    #[test]
    fn test_search_progress_lines() {
        let mut reporter = StatusReporter::new(ResearchMode::Quick, "id");
        reporter.add_search_progress(1, 3, 1, true);
        reporter.add_search_progress(2, 3, 1, false);
        reporter.add_search_complete(1, 3);
        let status = reporter.get_current_status();
        assert!(status.contains("✓ Search 1/3 completed - 1 successful so far"));
        assert!(status.contains("✗ Search 2/3 failed"));
        assert!(status.contains("**Searches complete** - 1/3 successful"));
    }

    #[test]
    fn test_confidence_line() {
        let mut reporter = StatusReporter::new(ResearchMode::Quick, "id");
        reporter.add_writing_complete(0.853);
        assert!(
            reporter
                .get_current_status()
                .contains("Confidence: High (0.85)")
        );
    }

    #[test]
    fn test_saved_id_is_shortened() {
        let mut reporter = StatusReporter::new(ResearchMode::Quick, "id");
        reporter.add_saved("0123456789abcdef");
        assert!(reporter.get_current_status().contains("Report ID: 01234567..."));
    }

    #[test]
    fn test_stop_notice() {
        let mut reporter = StatusReporter::new(ResearchMode::Quick, "id");
        reporter.add_stopped_by_user();
        let status = reporter.get_current_status();
        assert!(status.contains("Research Stopped by User"));
        assert!(status.contains("Results not saved"));
    }
}
