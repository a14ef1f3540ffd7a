//! System prompts and user-message builders for the agents.
//!
//! System prompts are loaded from template files when present, falling
//! back to the compiled-in defaults below. The planner template contains
//! `{mode}`, `{description}`, `{min_sources}` and `{max_sources}`
//! placeholders that are filled per run from the mode budget.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::{ResearchMode, SearchPlanItem, get_mode_config};

/// System prompt for the planner agent.
pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are a research planning assistant operating in {mode} mode ({description}).

Given a research query, produce the set of web searches that will best answer it.

Output between {min_sources} and {max_sources} searches. Each search should:
- target one specific aspect or angle of the query
- use effective search keywords
- not overlap with the other searches
- widen the diversity of sources

Prefer quality and diversity of sources over volume.

## Output Format (JSON)

```json
{"searches": [{"query": "search term", "reason": "why this search matters for the query"}]}
```

Return ONLY the JSON object, no surrounding text."#;

/// System prompt for the search agent.
pub const SEARCH_SYSTEM_PROMPT: &str = r"You are a research assistant. Given a search term, search the web for it and write a concise summary of the results.

The summary must be 2-3 paragraphs and under 300 words. Capture the main points; write tersely, sentence fragments are fine. It will be read by someone synthesizing a report, so keep the facts, figures, names and dates and drop everything else. Do not add commentary beyond the summary itself.";

/// System prompt for the writer agent.
pub const WRITER_SYSTEM_PROMPT: &str = r#"You are a senior researcher writing a comprehensive, structured research report.

You receive the original research query and numbered summaries of web searches. Synthesize ONLY from those summaries.

## Required sections

- summary: executive summary, 2-3 paragraphs
- goals: what the research set out to discover
- methodology: sources used and approach taken
- findings: detailed findings and key insights; the most thorough section
- competitors: competitive analysis, or "[Information not available]" when not applicable
- risks: risks, challenges, limitations
- opportunities: opportunities and promising areas
- recommendations: concrete, actionable next steps
- confidence_score: your confidence from 0.0 to 1.0 (it will be recalculated)
- markdown_report: every section combined into one markdown document with a table of contents
- follow_up_questions: 3-5 questions that address gaps in the research

Never omit a section. If information is genuinely missing, write "[Information not available]".

Mark uncertain claims ("Evidence suggests...", "Based on limited information..."). Use "[Conflicting information]" where sources disagree and "[Unverified]" for single-source claims.

## Output Format (JSON)

```json
{"summary": "...", "goals": "...", "methodology": "...", "findings": "...", "competitors": "...", "risks": "...", "opportunities": "...", "recommendations": "...", "confidence_score": 0.7, "markdown_report": "...", "follow_up_questions": ["..."]}
```

Return ONLY the JSON object, no surrounding text."#;

/// System prompt for the email composer agent.
pub const EMAIL_SYSTEM_PROMPT: &str = r#"You turn a markdown research report into one well-presented HTML email.

Convert the report into clean, readable HTML and choose an appropriate subject line.

## Output Format (JSON)

```json
{"subject": "subject line", "html_body": "<html>...</html>"}
```

Return ONLY the JSON object, no surrounding text."#;

/// System prompt for the clarifier agent.
pub const CLARIFIER_SYSTEM_PROMPT: &str = r#"You decide whether a research query is specific enough to research well.

A clear query has a specific topic, a clear intent and a defined scope. A vague query is too broad, uses ambiguous terms or lacks context ("AI", "best practices", "latest trends").

If the query is vague, ask 2-3 short, focused questions about purpose, scope, constraints or specific interests. Avoid yes/no questions. If the query is clear, ask nothing. Only request clarification when it would genuinely improve the research.

## Output Format (JSON)

```json
{"needs_clarification": true, "clarifying_questions": ["..."], "reasoning": "one sentence"}
```

Return ONLY the JSON object, no surrounding text."#;

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/deeptrace/prompts";

const PLANNER_FILENAME: &str = "planner.md";
const SEARCH_FILENAME: &str = "search.md";
const WRITER_FILENAME: &str = "writer.md";
const EMAIL_FILENAME: &str = "email.md";
const CLARIFIER_FILENAME: &str = "clarifier.md";

/// System prompts for every agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Planner template (with mode placeholders).
    pub planner: String,
    /// Search agent prompt.
    pub search: String,
    /// Writer prompt.
    pub writer: String,
    /// Email composer prompt.
    pub email: String,
    /// Clarifier prompt.
    pub clarifier: String,
}

impl PromptSet {
    /// Loads prompts, falling back per file to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. `prompt_dir` (from `--prompt-dir`)
    /// 2. `DEEPTRACE_PROMPT_DIR`
    /// 3. `~/.config/deeptrace/prompts/`
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("DEEPTRACE_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            planner: load_file(PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            search: load_file(SEARCH_FILENAME, SEARCH_SYSTEM_PROMPT),
            writer: load_file(WRITER_FILENAME, WRITER_SYSTEM_PROMPT),
            email: load_file(EMAIL_FILENAME, EMAIL_SYSTEM_PROMPT),
            clarifier: load_file(CLARIFIER_FILENAME, CLARIFIER_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            planner: PLANNER_SYSTEM_PROMPT.to_string(),
            search: SEARCH_SYSTEM_PROMPT.to_string(),
            writer: WRITER_SYSTEM_PROMPT.to_string(),
            email: EMAIL_SYSTEM_PROMPT.to_string(),
            clarifier: CLARIFIER_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the default prompts into `dir`, skipping existing files.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            (SEARCH_FILENAME, SEARCH_SYSTEM_PROMPT),
            (WRITER_FILENAME, WRITER_SYSTEM_PROMPT),
            (EMAIL_FILENAME, EMAIL_SYSTEM_PROMPT),
            (CLARIFIER_FILENAME, CLARIFIER_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }
        Ok(written)
    }

    /// `~/.config/deeptrace/prompts`, if a home directory exists.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Fills the planner template with the budget of `mode`.
#[must_use]
pub fn render_planner_prompt(template: &str, mode: ResearchMode) -> String {
    let config = get_mode_config(mode);
    template
        .replace("{mode}", mode.label())
        .replace("{description}", config.description)
        .replace("{min_sources}", &config.min_sources.to_string())
        .replace("{max_sources}", &config.max_sources.to_string())
}

/// User message for the planner.
#[must_use]
pub fn build_planner_prompt(query: &str) -> String {
    format!("Query: {query}")
}

/// User message for one search.
#[must_use]
pub fn build_search_prompt(item: &SearchPlanItem) -> String {
    format!(
        "Search term: {}\nReason for searching: {}",
        item.query, item.reason
    )
}

/// User message for the writer.
#[must_use]
pub fn build_writer_prompt(query: &str, results: &[String]) -> String {
    let mut prompt = format!(
        "Original query: {query}\n\nNumber of sources: {}\n\nSummarized search results:\n",
        results.len()
    );
    for (i, result) in results.iter().enumerate() {
        let _ = write!(prompt, "\n### Source {}\n{result}\n", i + 1);
    }
    prompt
}

/// User message for the email composer.
#[must_use]
pub fn build_email_prompt(markdown: &str) -> String {
    format!("Report:\n\n{markdown}")
}

/// User message for the clarifier.
#[must_use]
pub fn build_clarifier_prompt(query: &str) -> String {
    format!("Query to analyze: {query}")
}
