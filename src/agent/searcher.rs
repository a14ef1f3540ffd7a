//! Search agent: runs one planned search and summarizes the results.
//!
//! The configured search model browses on its own; this agent only frames
//! the request and validates that a summary came back.

use std::sync::Arc;

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::build_search_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::core::SearchPlanItem;
use crate::error::AgentError;
use crate::research::SearchService;

/// Summarizes web results for one [`SearchPlanItem`].
pub struct SearchAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SearchAgent {
    /// Creates a search agent.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            model: config.search_model.clone(),
            max_tokens: config.search_max_tokens,
            system_prompt,
        }
    }
}

impl std::fmt::Debug for SearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Agent for SearchAgent {
    fn name(&self) -> &'static str {
        "search"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait]
impl SearchService for SearchAgent {
    async fn search(&self, item: &SearchPlanItem) -> Result<String, AgentError> {
        let response = self
            .execute(self.provider.as_ref(), &build_search_prompt(item))
            .await?;
        let summary = response.content.trim();
        if summary.is_empty() {
            return Err(AgentError::ResponseParse {
                message: format!("empty summary for search '{}'", item.query),
                content: response.content,
            });
        }
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::{ScriptedProvider, test_config};

    #[tokio::test]
    async fn test_search_returns_trimmed_summary() {
        let provider = Arc::new(ScriptedProvider::new([Ok("  Tokio leads adoption.\n")]));
        let agent = SearchAgent::new(provider.clone(), &test_config(), "search".to_string());

        let summary = agent
            .search(&SearchPlanItem::new("tokio adoption", "market share"))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(summary, "Tokio leads adoption.");

        let request = provider.last_request().unwrap_or_else(|| unreachable!());
        assert!(!request.json_mode);
        assert_eq!(request.model, test_config().search_model);
    }

    #[tokio::test]
    async fn test_empty_summary_is_error() {
        let provider = Arc::new(ScriptedProvider::new([Ok("   ")]));
        let agent = SearchAgent::new(provider, &test_config(), String::new());
        let result = agent.search(&SearchPlanItem::new("q", "")).await;
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new([Err(AgentError::ApiRequest {
            message: "rate limited".to_string(),
            status: Some(429),
        })]));
        let agent = SearchAgent::new(provider, &test_config(), String::new());
        let result = agent.search(&SearchPlanItem::new("q", "")).await;
        assert!(matches!(
            result,
            Err(AgentError::ApiRequest {
                status: Some(429),
                ..
            })
        ));
    }
}
