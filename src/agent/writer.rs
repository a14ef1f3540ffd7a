//! Writer agent: synthesizes search summaries into a [`ReportData`].

use std::sync::Arc;

use async_trait::async_trait;

use super::config::AgentConfig;
use super::prompt::build_writer_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json};
use crate::core::ReportData;
use crate::error::AgentError;
use crate::research::WritingService;

/// Writes the structured report.
pub struct WriterAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl WriterAgent {
    /// Creates a writer agent.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            provider,
            model: config.writer_model.clone(),
            max_tokens: config.writer_max_tokens,
            system_prompt,
        }
    }
}

impl std::fmt::Debug for WriterAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Agent for WriterAgent {
    fn name(&self) -> &'static str {
        "writer"
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

#[async_trait]
impl WritingService for WriterAgent {
    async fn write(&self, query: &str, results: &[String]) -> Result<ReportData, AgentError> {
        let response = self
            .execute(self.provider.as_ref(), &build_writer_prompt(query, results))
            .await?;
        if response.finish_reason.as_deref() == Some("length") {
            tracing::warn!(max_tokens = self.max_tokens, "writer output hit the token limit");
        }
        let report: ReportData = parse_json("report", &response.content)?;
        if report.markdown_report.trim().is_empty() {
            return Err(AgentError::ResponseParse {
                message: "report has an empty markdown body".to_string(),
                content: response.content,
            });
        }
        Ok(report)
    }
}
