//! Planner agent: turns a research query into a [`SearchPlan`].

use std::sync::Arc;

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::{build_planner_prompt, render_planner_prompt};
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json};
use crate::core::{ResearchMode, SearchPlan};
use crate::error::AgentError;
use crate::research::PlanningService;

/// Plans the searches for a query within a mode's source budget.
pub struct PlannerAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    template: String,
}

impl PlannerAgent {
    /// Creates a planner from configuration and a (templated) system prompt.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, template: String) -> Self {
        Self {
            provider,
            model: config.planner_model.clone(),
            max_tokens: config.planner_max_tokens,
            template,
        }
    }
}

impl std::fmt::Debug for PlannerAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Agent for PlannerAgent {
    fn name(&self) -> &'static str {
        "planner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.template
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait]
impl PlanningService for PlannerAgent {
    async fn plan(&self, query: &str, mode: ResearchMode) -> Result<SearchPlan, AgentError> {
        let system = render_planner_prompt(&self.template, mode);
        let response = self
            .execute_with_system(self.provider.as_ref(), &system, &build_planner_prompt(query))
            .await?;
        let plan: SearchPlan = parse_json("search plan", &response.content)?;
        tracing::info!(mode = %mode, proposed = plan.len(), "search plan received");
        Ok(plan)
    }
}
