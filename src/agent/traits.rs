//! Agent trait definition.
//!
//! Every LLM-backed role (planner, search, writer, email composer,
//! clarifier) implements [`Agent`], which turns a user message into a
//! provider call with the role's fixed model settings.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::message::{ChatRequest, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging.
    fn name(&self) -> &'static str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// System prompt defining the agent's role.
    fn system_prompt(&self) -> &str;

    /// Whether to request a JSON object response.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature.
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Runs the agent with its own system prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        self.execute_with_system(provider, self.system_prompt(), user_msg)
            .await
    }

    /// Runs the agent with an explicit system prompt.
    ///
    /// Used by agents whose instructions depend on per-call context.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute_with_system(
        &self,
        provider: &dyn LlmProvider,
        system_prompt: &str,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(system_prompt), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        };

        let response = provider.chat(&request).await?;
        tracing::debug!(
            agent = self.name(),
            provider = provider.name(),
            total_tokens = response.usage.total_tokens,
            "agent call finished"
        );

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Parses a JSON payload from a model response.
///
/// Markdown code fences around the payload are stripped first.
///
/// # Errors
///
/// Returns [`AgentError::ResponseParse`] with the raw content on failure.
pub fn parse_json<T: DeserializeOwned>(what: &str, content: &str) -> Result<T, AgentError> {
    let trimmed = content.trim();
    let json_str = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    serde_json::from_str(json_str).map_err(|e| AgentError::ResponseParse {
        message: format!("Failed to parse {what}: {e}"),
        content: content.to_string(),
    })
}
