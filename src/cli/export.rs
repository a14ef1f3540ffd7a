//! Markdown export of finished reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

const MAX_SLUG_CHARS: usize = 50;

/// Turns a query into a filename-safe slug.
///
/// Takes the first 50 characters, maps spaces and slashes to `_` and
/// keeps only ASCII alphanumerics, `_` and `-`. Returns `"report"` if
/// nothing survives.
#[must_use]
pub fn slugify(query: &str) -> String {
    let slug: String = query
        .chars()
        .take(MAX_SLUG_CHARS)
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}

/// `research_{slug}_{YYYYmmdd_HHMMSS}.md`
#[must_use]
pub fn export_filename(query: &str, at: DateTime<Local>) -> String {
    format!(
        "research_{}_{}.md",
        slugify(query),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes `markdown` into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub fn export_report(dir: &Path, query: &str, markdown: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(query, Local::now()));
    std::fs::write(&path, markdown)?;
    tracing::info!(path = %path.display(), "report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("rust async runtimes", "rust_async_runtimes" ; "spaces")]
    #[test_case("TCP/IP stacks", "TCP_IP_stacks" ; "slash")]
    #[test_case("what's new in C++?", "whats_new_in_C" ; "punctuation dropped")]
    #[test_case("日本語", "report" ; "nothing survives")]
    #[test_case("", "report" ; "empty")]
    fn test_slugify(query: &str, expected: &str) {
        assert_eq!(slugify(query), expected);
    }

    #[test]
    fn test_slug_limited_to_fifty_chars() {
        let query = "a".repeat(80);
        assert_eq!(slugify(&query).len(), 50);
    }

    #[test]
    fn test_export_filename() {
        let at = Local
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(
            export_filename("edge ai", at),
            "research_edge_ai_20260203_040506.md"
        );
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let target = dir.path().join("nested");
        let path = export_report(&target, "q", "# Report").unwrap_or_else(|_| unreachable!());
        assert!(path.starts_with(&target));
        let content = std::fs::read_to_string(&path).unwrap_or_else(|_| unreachable!());
        assert_eq!(content, "# Report");
    }
}
