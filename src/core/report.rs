//! Data types flowing through a research run.
//!
//! [`SearchPlan`] is produced by the planner and consumed by the search
//! fan-out; [`ReportData`] is produced by the writer (or synthesized on
//! failure) and is what gets scored, persisted and emitted.

use serde::{Deserialize, Serialize};

use super::mode::{ResearchMode, validate_source_count};

/// One planned web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlanItem {
    /// The search term to run.
    pub query: String,
    /// Why this search helps answer the research question.
    #[serde(default)]
    pub reason: String,
}

impl SearchPlanItem {
    /// Creates a plan item.
    #[must_use]
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// Ordered list of searches for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Planned searches in the planner's order.
    #[serde(default)]
    pub searches: Vec<SearchPlanItem>,
}

impl SearchPlan {
    /// Creates a plan from items.
    #[must_use]
    pub const fn new(searches: Vec<SearchPlanItem>) -> Self {
        Self { searches }
    }

    /// Number of planned searches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    /// Returns `true` when nothing was planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    /// Truncates the plan to the budget of `mode`.
    ///
    /// See [`validate_source_count`]: only the upper bound is enforced.
    #[must_use]
    pub fn clamp_to(mut self, mode: ResearchMode) -> Self {
        let allowed = validate_source_count(self.searches.len(), mode);
        self.searches.truncate(allowed);
        self
    }
}

fn default_confidence() -> f64 {
    0.5
}

/// A structured research report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Executive summary.
    pub summary: String,
    /// What the research set out to answer.
    pub goals: String,
    /// How the research was conducted.
    pub methodology: String,
    /// Main findings.
    pub findings: String,
    /// Competitive landscape, when relevant.
    #[serde(default)]
    pub competitors: Option<String>,
    /// Risks identified.
    pub risks: String,
    /// Opportunities identified.
    pub opportunities: String,
    /// Recommended actions.
    pub recommendations: String,
    /// Confidence in `[0, 1]`. Overwritten by the scorer after writing.
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    /// Complete markdown rendering of the report.
    pub markdown_report: String,
    /// Questions worth researching next.
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

impl ReportData {
    /// Replaces the confidence score, clamped to `[0, 1]`.
    pub fn set_confidence(&mut self, score: f64) {
        self.confidence_score = score.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_of(n: usize) -> SearchPlan {
        SearchPlan::new(
            (0..n)
                .map(|i| SearchPlanItem::new(format!("query {i}"), format!("reason {i}")))
                .collect(),
        )
    }

    #[test]
    fn test_clamp_truncates_to_mode_budget() {
        let plan = plan_of(9).clamp_to(ResearchMode::Quick);
        assert_eq!(plan.len(), 6);
        assert_eq!(plan.searches[5].query, "query 5");
    }

    #[test]
    fn test_clamp_keeps_short_plan() {
        let plan = plan_of(2).clamp_to(ResearchMode::Deep);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_plan_deserializes_without_reason() {
        let plan: SearchPlan = serde_json::from_str(r#"{"searches":[{"query":"rust async"}]}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(plan.searches[0].query, "rust async");
        assert!(plan.searches[0].reason.is_empty());
    }

    #[test]
    fn test_report_defaults() {
        let json = r##"{
            "summary": "s", "goals": "g", "methodology": "m", "findings": "f",
            "risks": "r", "opportunities": "o", "recommendations": "rec",
            "markdown_report": "# Report"
        }"##;
        let report: ReportData = serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        assert!(report.competitors.is_none());
        assert!((report.confidence_score - 0.5).abs() < f64::EPSILON);
        assert!(report.follow_up_questions.is_empty());
    }

    #[test]
    fn test_set_confidence_clamps() {
        let json = r#"{"summary":"","goals":"","methodology":"","findings":"","risks":"",
            "opportunities":"","recommendations":"","markdown_report":""}"#;
        let mut report: ReportData =
            serde_json::from_str(json).unwrap_or_else(|_| unreachable!());
        report.set_confidence(1.7);
        assert!((report.confidence_score - 1.0).abs() < f64::EPSILON);
    }
}
