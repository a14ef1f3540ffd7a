//! Durable storage for finished reports.
//!
//! The pipeline only depends on [`ReportStore::save`]; browsing saved
//! reports is a concern of the concrete [`SqliteReportStore`] and the CLI.

pub mod sqlite;

use serde::Serialize;

use crate::core::{ReportData, ResearchMode};
use crate::error::StorageError;

pub use sqlite::SqliteReportStore;

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".deeptrace/reports.db";

/// The storage-side shape of a report: every [`ReportData`] field plus
/// the query and mode that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    /// Research question.
    pub query: String,
    /// Mode the run used.
    pub mode: ResearchMode,
    /// Executive summary.
    pub summary: String,
    /// Research goals.
    pub goals: String,
    /// Methodology.
    pub methodology: String,
    /// Findings.
    pub findings: String,
    /// Competitive landscape.
    pub competitors: Option<String>,
    /// Risks.
    pub risks: String,
    /// Opportunities.
    pub opportunities: String,
    /// Recommendations.
    pub recommendations: String,
    /// Confidence in `[0, 1]`.
    pub confidence_score: f64,
    /// Full markdown rendering.
    pub markdown_report: String,
    /// Suggested follow-up questions.
    pub follow_up_questions: Vec<String>,
}

impl ReportRecord {
    /// Converts a finished report and its run metadata into a record.
    #[must_use]
    pub fn from_report(query: &str, mode: ResearchMode, report: &ReportData) -> Self {
        Self {
            query: query.to_string(),
            mode,
            summary: report.summary.clone(),
            goals: report.goals.clone(),
            methodology: report.methodology.clone(),
            findings: report.findings.clone(),
            competitors: report.competitors.clone(),
            risks: report.risks.clone(),
            opportunities: report.opportunities.clone(),
            recommendations: report.recommendations.clone(),
            confidence_score: report.confidence_score,
            markdown_report: report.markdown_report.clone(),
            follow_up_questions: report.follow_up_questions.clone(),
        }
    }

    /// Checks the constraints every store enforces.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.query.trim().is_empty() {
            return Err(StorageError::InvalidRecord {
                message: "query must not be empty".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(StorageError::InvalidRecord {
                message: format!(
                    "confidence_score {} is outside [0, 1]",
                    self.confidence_score
                ),
            });
        }
        Ok(())
    }
}

/// A record as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    /// Store-assigned identifier.
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// The saved content.
    #[serde(flatten)]
    pub record: ReportRecord,
}

/// Something that can persist a report and hand back its identifier.
///
/// Implementations are synchronous; callers on an async runtime should
/// move the call onto a blocking thread.
pub trait ReportStore: Send + Sync {
    /// Saves `record` and returns its new identifier.
    fn save(&self, record: &ReportRecord) -> Result<String, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::fallback::build_error_report;

    fn record(score: f64) -> ReportRecord {
        let mut report = build_error_report::<&str>("q", "e", &[]);
        report.confidence_score = score;
        ReportRecord::from_report("q", ResearchMode::Deep, &report)
    }

    #[test]
    fn test_from_report_copies_fields() {
        let rec = record(0.0);
        assert_eq!(rec.query, "q");
        assert_eq!(rec.mode, ResearchMode::Deep);
        assert!(rec.summary.starts_with("Research failed"));
        assert_eq!(rec.follow_up_questions.len(), 3);
    }

    #[test]
    fn test_validate_confidence_bounds() {
        assert!(record(0.0).validate().is_ok());
        assert!(record(1.0).validate().is_ok());
        assert!(record(1.5).validate().is_err());
        assert!(record(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_empty_query() {
        let mut rec = record(0.5);
        rec.query = "  ".to_string();
        assert!(matches!(
            rec.validate(),
            Err(StorageError::InvalidRecord { .. })
        ));
    }
}
