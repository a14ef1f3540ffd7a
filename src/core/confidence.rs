//! Heuristic confidence scoring for synthesized reports.
//!
//! The score is additive: a base value, a bonus per source, a bonus for
//! lexical quality signals found in the results and a bonus for
//! vocabulary shared between results. The sum is clamped to `[0, 1]`.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

const BASE_SCORE: f64 = 0.30;
const PER_SOURCE: f64 = 0.05;
const MAX_SOURCE_TERM: f64 = 0.35;
const MAX_QUALITY_TERM: f64 = 0.25;
const MAX_CONSISTENCY_TERM: f64 = 0.10;

/// Quality signal categories. Each counts at most once.
static QUALITY_CATEGORIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // academic
        r"(?i)\.edu|\bstudy\b|\bresearch\b|\buniversity\b|\bjournal\b|\bpublished\b|\bpaper\b",
        // government
        r"(?i)\.gov|\bpolicy\b|\bregulation\b|\bofficial\b",
        // technical / quantitative
        r"(?i)\d+%|\d+\.\d+|\bdata\b|\bstatistics\b|\bmetrics\b|\banalysis\b",
        // recency
        r"(?i)2025|2024|\brecent\b|\blatest\b|\bcurrent\b",
        // reputable organisations
        r"(?i)\b(?:WHO|NASA|NIH|IEEE|Nature|Science|Reuters|Bloomberg)\b",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").ok());

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "this",
    "that", "these", "those",
];

/// Computes a confidence score in `[0, 1]` for a set of search results.
///
/// Returns exactly `0.0` when `num_sources` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_confidence<S: AsRef<str>>(num_sources: usize, search_results: &[S]) -> f64 {
    if num_sources == 0 {
        return 0.0;
    }

    let source_term = (num_sources as f64 * PER_SOURCE).min(MAX_SOURCE_TERM);
    let quality_term = quality_term(search_results);
    let consistency_term = consistency_term(search_results);

    (BASE_SCORE + source_term + quality_term + consistency_term).clamp(0.0, 1.0)
}

#[allow(clippy::cast_precision_loss)]
fn quality_term<S: AsRef<str>>(results: &[S]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let combined = results
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    let matched = QUALITY_CATEGORIES
        .iter()
        .filter(|category| category.is_match(&combined))
        .count();

    (matched as f64 / 5.0) * MAX_QUALITY_TERM
}

/// Fraction of distinct tokens that occur in two or more results.
#[allow(clippy::cast_precision_loss)]
fn consistency_term<S: AsRef<str>>(results: &[S]) -> f64 {
    let Some(token_re) = TOKEN.as_ref() else {
        return 0.0;
    };
    if results.len() < 2 {
        return 0.0;
    }

    let mut document_frequency: HashMap<String, usize> = HashMap::new();
    for result in results {
        let lowered = result.as_ref().to_lowercase();
        let tokens: HashSet<&str> = token_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !STOPWORDS.contains(t))
            .collect();
        for token in tokens {
            *document_frequency.entry(token.to_string()).or_default() += 1;
        }
    }

    let unique = document_frequency.len();
    if unique == 0 {
        return 0.0;
    }
    let shared = document_frequency.values().filter(|&&n| n >= 2).count();

    ((shared as f64 / unique as f64) * MAX_CONSISTENCY_TERM).min(MAX_CONSISTENCY_TERM)
}

/// Qualitative band for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceLabel {
    /// `[0.0, 0.2)`
    Low,
    /// `[0.2, 0.4)`
    LowModerate,
    /// `[0.4, 0.6)`
    Moderate,
    /// `[0.6, 0.8)`
    ModerateHigh,
    /// `[0.8, 1.0]`
    High,
}

impl ConfidenceLabel {
    /// Maps a score onto its band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::ModerateHigh
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::LowModerate
        } else {
            Self::Low
        }
    }

    /// Returns the display text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::ModerateHigh => "Moderate-High",
            Self::Moderate => "Moderate",
            Self::LowModerate => "Low-Moderate",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the label text for `score`.
#[must_use]
pub fn get_confidence_label(score: f64) -> &'static str {
    ConfidenceLabel::from_score(score).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    const EMPTY: &[&str] = &[];

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_zero_sources_is_exactly_zero() {
        assert!(calculate_confidence(0, EMPTY) == 0.0);
        assert!(calculate_confidence(0, &["published study from 2024"]) == 0.0);
    }

    #[test]
    fn test_single_plain_result() {
        // base + one source, no quality signals, no consistency with one result
        let score = calculate_confidence(1, &["plain words here"]);
        assert!((score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_source_term_caps() {
        let ten = calculate_confidence(10, EMPTY);
        let twenty = calculate_confidence(20, EMPTY);
        assert!((ten - 0.65).abs() < 1e-9);
        assert!((twenty - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_all_quality_categories() {
        let text = "A university study on .gov policy shows 42% growth, \
                    per recent Reuters data.";
        let score = calculate_confidence(1, &[text]);
        assert!((score - (0.30 + 0.05 + 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_quality_is_case_insensitive() {
        let score = calculate_confidence(1, &["The JOURNAL entry"]);
        assert!((score - (0.35 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_counts_distinct_results() {
        // "rust" twice in the same result is not shared
        let solo = consistency_term(&["rust rust", "python"]);
        assert!(solo.abs() < f64::EPSILON);

        // identical vocabulary across results is fully shared
        let full = consistency_term(&["memory safety", "memory safety"]);
        assert!((full - 0.10).abs() < 1e-9);

        // one of three distinct tokens shared
        let partial = consistency_term(&["apple banana", "apple cherry"]);
        assert!((partial - 0.10 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_ignores_stopwords_and_short_tokens() {
        assert!(consistency_term(&["this that with", "this that with"]).abs() < f64::EPSILON);
        assert!(consistency_term(&["cat dog", "cat dog"]).abs() < f64::EPSILON);
    }

    #[test_case(1.0 => "High")]
    #[test_case(0.8 => "High")]
    #[test_case(0.79 => "Moderate-High")]
    #[test_case(0.6 => "Moderate-High")]
    #[test_case(0.5 => "Moderate")]
    #[test_case(0.4 => "Moderate")]
    #[test_case(0.39 => "Low-Moderate")]
    #[test_case(0.2 => "Low-Moderate")]
    #[test_case(0.19 => "Low")]
    #[test_case(0.0 => "Low")]
    fn test_labels(score: f64) -> &'static str {
        get_confidence_label(score)
    }

    #[test]
    fn test_label_ordering() {
        assert!(ConfidenceLabel::High > ConfidenceLabel::ModerateHigh);
        assert!(ConfidenceLabel::LowModerate > ConfidenceLabel::Low);
    }

    proptest! {
        #[test]
        fn prop_score_in_unit_interval(n in 0usize..100, texts in proptest::collection::vec(".{0,80}", 0..6)) {
            let score = calculate_confidence(n, &texts);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_monotonic_in_sources(n in 1usize..60, texts in proptest::collection::vec("[a-z ]{0,60}", 0..5)) {
            let lower = calculate_confidence(n, &texts);
            let higher = calculate_confidence(n + 1, &texts);
            prop_assert!(higher >= lower);
        }
    }
}
