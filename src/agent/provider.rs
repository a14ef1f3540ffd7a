//! Pluggable LLM provider trait.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// A chat-completion backend.
///
/// Implementations own the transport (HTTP client, auth, timeouts) and
/// present a uniform interface to the agents.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name, e.g. `"openai"`.
    fn name(&self) -> &'static str;

    /// Executes a chat completion.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] on transport or API failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
