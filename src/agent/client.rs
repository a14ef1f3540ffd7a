//! Provider registry and service wiring.

use std::sync::Arc;

use super::clarifier::ClarifierAgent;
use super::config::{AgentConfig, EmailConfig};
use super::email::EmailAgent;
use super::planner::PlannerAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::providers::OpenAiProvider;
use super::searcher::SearchAgent;
use super::writer::WriterAgent;
use crate::error::AgentError;
use crate::research::ResearchServices;

/// Creates the provider registered under `name`.
///
/// # Supported Providers
///
/// - `"openai"`: `OpenAI`-compatible APIs via `async-openai`
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown names.
pub fn create_provider(name: &str, config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match name {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

/// Builds the LLM-backed services of a research run.
///
/// The search agent uses `config.search_provider`; the others use
/// `config.provider`. Email is attached only when `email` is `Some`.
/// No store is attached.
///
/// # Errors
///
/// Returns [`AgentError`] for unknown providers or client setup failures.
pub fn research_services(
    config: &AgentConfig,
    prompts: &PromptSet,
    email: Option<EmailConfig>,
) -> Result<ResearchServices, AgentError> {
    let provider = create_provider(&config.provider, config)?;
    let search_provider = if config.search_provider == config.provider {
        Arc::clone(&provider)
    } else {
        create_provider(&config.search_provider, config)?
    };

    let mut services = ResearchServices::new(
        Arc::new(PlannerAgent::new(
            Arc::clone(&provider),
            config,
            prompts.planner.clone(),
        )),
        Arc::new(SearchAgent::new(search_provider, config, prompts.search.clone())),
        Arc::new(WriterAgent::new(
            Arc::clone(&provider),
            config,
            prompts.writer.clone(),
        )),
    );

    if let Some(email) = email {
        tracing::debug!(to = %email.to, "email delivery enabled");
        services = services.with_email(Arc::new(EmailAgent::new(
            provider,
            config,
            prompts.email.clone(),
            email,
        )?));
    }

    Ok(services)
}

/// Builds the clarifier.
///
/// # Errors
///
/// Returns [`AgentError`] for unknown providers or client setup failures.
pub fn clarifier(config: &AgentConfig, prompts: &PromptSet) -> Result<ClarifierAgent, AgentError> {
    let provider = create_provider(&config.provider, config)?;
    Ok(ClarifierAgent::new(provider, config, prompts.clarifier.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::test_config;

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider("openai", &test_config()).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("carrier-pigeon", &test_config());
        assert!(matches!(
            result,
            Err(AgentError::UnsupportedProvider { ref name }) if name == "carrier-pigeon"
        ));
    }

    #[test]
    fn test_research_services_without_email() {
        let services = research_services(&test_config(), &PromptSet::defaults(), None)
            .unwrap_or_else(|_| unreachable!());
        assert!(services.email.is_none());
        assert!(services.store.is_none());
    }

    #[test]
    fn test_unknown_search_provider_fails() {
        let mut config = test_config();
        config.search_provider = "nope".to_string();
        assert!(research_services(&config, &PromptSet::defaults(), None).is_err());
    }
}
