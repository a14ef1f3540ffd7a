//! Clarifier agent: flags vague queries before a run is started.
//!
//! Not part of the research state machine; the CLI exposes it through
//! the `clarify` command.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::AgentConfig;
use super::prompt::build_clarifier_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json};
use crate::error::AgentError;

/// The clarifier's verdict on a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clarification {
    /// `true` if the query should be narrowed first.
    pub needs_clarification: bool,
    /// Questions that would narrow the scope.
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    /// Short justification.
    #[serde(default)]
    pub reasoning: String,
}

/// Judges whether a query is specific enough.
pub struct ClarifierAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ClarifierAgent {
    /// Creates a clarifier using the planner's model settings.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            model: config.planner_model.clone(),
            max_tokens: config.planner_max_tokens,
            system_prompt,
        }
    }

    /// Analyzes `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn clarify(&self, query: &str) -> Result<Clarification, AgentError> {
        let response = self
            .execute(self.provider.as_ref(), &build_clarifier_prompt(query))
            .await?;
        let mut verdict: Clarification = parse_json("clarification", &response.content)?;
        if !verdict.needs_clarification {
            verdict.clarifying_questions.clear();
        }
        Ok(verdict)
    }
}

impl std::fmt::Debug for ClarifierAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarifierAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Agent for ClarifierAgent {
    fn name(&self) -> &'static str {
        "clarifier"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
