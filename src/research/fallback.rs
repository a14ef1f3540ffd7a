//! Synthesized reports for runs that could not finish.
//!
//! Every failure branch of the orchestrator ends here, so the caller always
//! receives a complete, renderable [`ReportData`].

use std::fmt::Write;

use crate::core::ReportData;

const NOT_AVAILABLE: &str = "[Information not available due to error]";

/// Builds a fully populated report describing a failed run.
///
/// Any `partial_results` are numbered and embedded in the findings.
/// The confidence score is always `0.0`.
#[must_use]
pub fn build_error_report<S: AsRef<str>>(
    query: &str,
    error_message: &str,
    partial_results: &[S],
) -> ReportData {
    let has_partial = !partial_results.is_empty();

    let mut findings = String::from("[Error occurred during research]\n\n");
    if has_partial {
        findings.push_str("**Partial Results Retrieved:**\n\n");
        for (i, result) in partial_results.iter().enumerate() {
            let _ = write!(findings, "{}. {}\n\n", i + 1, result.as_ref());
        }
    } else {
        findings.push_str("No search results were retrieved before the error occurred.");
    }

    let summary = format!("Research failed: {error_message}");
    let recommendations = "Retry the query or contact support".to_string();

    let markdown_report = format!(
        "# Research Report: {query}\n\n\
         ## ⚠️ Error Notice\n\n\
         **Status:** Research incomplete due to system error\n\n\
         **Error:** {error_message}\n\n\
         **Partial Results:** {}\n\n\
         ---\n\n\
         ## Summary\n\n\
         {summary}\n\n\
         ## Findings\n\n\
         {findings}\n\n\
         ## Recommendations\n\n\
         {recommendations}\n",
        if has_partial { "Yes" } else { "No" }
    );

    ReportData {
        summary,
        goals: format!("Attempted to research: {query}"),
        methodology: "Research pipeline encountered an error before completion".to_string(),
        findings,
        competitors: Some(NOT_AVAILABLE.to_string()),
        risks: "System error prevented complete research execution".to_string(),
        opportunities: "Retry may succeed; consider query refinement".to_string(),
        recommendations,
        confidence_score: 0.0,
        markdown_report,
        follow_up_questions: vec![
            "Can the query be made more specific?".to_string(),
            "Is the search provider reachable and configured?".to_string(),
            "Would quick mode succeed where deep mode failed?".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_without_partial_results() {
        let report = build_error_report("test", "Failed to plan research searches", NONE);
        assert!(report.findings.contains("No search results were retrieved"));
        assert!(report.confidence_score.abs() < f64::EPSILON);
        assert_eq!(report.summary, "Research failed: Failed to plan research searches");
        assert!(report.markdown_report.starts_with("# Research Report: test"));
        assert!(report.markdown_report.contains("**Partial Results:** No"));
    }

    #[test]
    fn test_partial_results_are_numbered() {
        let report = build_error_report(
            "rust adoption",
            "Failed to generate structured report",
            &["first summary", "second summary"],
        );
        assert!(report.findings.contains("**Partial Results Retrieved:**"));
        assert!(report.findings.contains("1. first summary"));
        assert!(report.findings.contains("2. second summary"));
        assert!(report.markdown_report.contains("**Partial Results:** Yes"));
        assert!(report.markdown_report.contains("2. second summary"));
    }

    #[test]
    fn test_every_field_populated() {
        let report = build_error_report("", "", NONE);
        for field in [
            &report.summary,
            &report.goals,
            &report.methodology,
            &report.findings,
            &report.risks,
            &report.opportunities,
            &report.recommendations,
            &report.markdown_report,
        ] {
            assert!(!field.is_empty());
        }
        assert!(report.competitors.is_some());
        assert_eq!(report.follow_up_questions.len(), 3);
    }
}
