//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::agent::Clarification;
use crate::core::get_confidence_label;
use crate::storage::StoredReport;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognised is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Truncates `s` to `max` characters, appending `...` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

/// Formats a report listing.
#[must_use]
pub fn format_report_list(reports: &[StoredReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(reports),
        OutputFormat::Text => {
            if reports.is_empty() {
                return "No saved reports.\n".to_string();
            }
            let mut out = format!(
                "{:<10} {:<20} {:<6} {:<10} {}\n",
                "ID", "CREATED", "MODE", "CONF", "QUERY"
            );
            for report in reports {
                let id: String = report.id.chars().take(8).collect();
                let created: String = report.created_at.chars().take(19).collect();
                let _ = writeln!(
                    out,
                    "{:<10} {:<20} {:<6} {:<10} {}",
                    id,
                    created.replace('T', " "),
                    report.record.mode.as_str(),
                    format!("{:.2}", report.record.confidence_score),
                    truncate(&report.record.query, 60)
                );
            }
            let _ = writeln!(out, "\n{} report(s)", reports.len());
            out
        }
    }
}

/// Formats a single saved report.
#[must_use]
pub fn format_report(report: &StoredReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(report),
        OutputFormat::Text => {
            let record = &report.record;
            let mut out = String::new();
            let _ = writeln!(out, "ID:         {}", report.id);
            let _ = writeln!(out, "Created:    {}", report.created_at);
            let _ = writeln!(out, "Query:      {}", record.query);
            let _ = writeln!(out, "Mode:       {}", record.mode.label());
            let _ = writeln!(
                out,
                "Confidence: {:.2} ({})",
                record.confidence_score,
                get_confidence_label(record.confidence_score)
            );
            out.push('\n');
            out.push_str(&record.markdown_report);
            if !record.follow_up_questions.is_empty() {
                out.push_str("\n\n## Follow-up Questions\n\n");
                for question in &record.follow_up_questions {
                    let _ = writeln!(out, "- {question}");
                }
            }
            out
        }
    }
}

/// Formats the clarifier's verdict.
#[must_use]
pub fn format_clarification(query: &str, verdict: &Clarification, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(&serde_json::json!({
            "query": query,
            "needs_clarification": verdict.needs_clarification,
            "clarifying_questions": verdict.clarifying_questions,
            "reasoning": verdict.reasoning,
        })),
        OutputFormat::Text => {
            let mut out = if verdict.needs_clarification {
                "The query could be narrowed before researching it.\n".to_string()
            } else {
                "The query is specific enough to research.\n".to_string()
            };
            if !verdict.reasoning.is_empty() {
                let _ = writeln!(out, "\n{}", verdict.reasoning);
            }
            if !verdict.clarifying_questions.is_empty() {
                out.push_str("\nConsider answering:\n");
                for (i, question) in verdict.clarifying_questions.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {question}", i + 1);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ReportData, ResearchMode};
    use crate::storage::ReportRecord;

    fn stored(id: &str, query: &str) -> StoredReport {
        let report = ReportData {
            summary: "s".to_string(),
            goals: "g".to_string(),
            methodology: "m".to_string(),
            findings: "f".to_string(),
            competitors: None,
            risks: "r".to_string(),
            opportunities: "o".to_string(),
            recommendations: "rec".to_string(),
            confidence_score: 0.72,
            markdown_report: "# Findings".to_string(),
            follow_up_questions: vec!["What next?".to_string()],
        };
        StoredReport {
            id: id.to_string(),
            created_at: "2026-03-01T10:20:30.123456+00:00".to_string(),
            record: ReportRecord::from_report(query, ResearchMode::Deep, &report),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(
            format_report_list(&[], OutputFormat::Text),
            "No saved reports.\n"
        );
        assert_eq!(format_report_list(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn test_list_row_uses_short_id() {
        let out = format_report_list(
            &[stored("0123456789abcdef", "rust")],
            OutputFormat::Text,
        );
        assert!(out.contains("01234567 "));
        assert!(!out.contains("0123456789"));
        assert!(out.contains("2026-03-01 10:20:30"));
        assert!(out.contains("deep"));
        assert!(out.contains("0.72"));
        assert!(out.contains("1 report(s)"));
    }

    #[test]
    fn test_long_query_truncated() {
        let query = "q".repeat(100);
        let out = format_report_list(&[stored("id", &query)], OutputFormat::Text);
        assert!(out.contains(&format!("{}...", "q".repeat(57))));
    }

    #[test]
    fn test_show_text() {
        let out = format_report(&stored("abc", "rust"), OutputFormat::Text);
        assert!(out.contains("Mode:       DEEP"));
        assert!(out.contains("Confidence: 0.72 (Moderate-High)"));
        assert!(out.contains("# Findings"));
        assert!(out.contains("- What next?"));
    }

    #[test]
    fn test_show_json_flattens_record() {
        let out = format_report(&stored("abc", "rust"), OutputFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["id"], "abc");
        assert_eq!(value["query"], "rust");
        assert_eq!(value["mode"], "deep");
    }

    #[test]
    fn test_clarification_text() {
        let verdict = Clarification {
            needs_clarification: true,
            clarifying_questions: vec!["Which region?".to_string()],
            reasoning: "too broad".to_string(),
        };
        let out = format_clarification("AI", &verdict, OutputFormat::Text);
        assert!(out.contains("could be narrowed"));
        assert!(out.contains("  1. Which region?"));
    }
}
