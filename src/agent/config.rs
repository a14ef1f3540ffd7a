//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default model for the planner, writer, email and clarifier agents.
const DEFAULT_MODEL: &str = "gpt-5-nano";
/// Default model for the search agent; it must be able to browse.
const DEFAULT_SEARCH_MODEL: &str = "gpt-4o-mini-search-preview";
/// Default planner max tokens.
const DEFAULT_PLANNER_MAX_TOKENS: u32 = 2048;
/// Default search max tokens.
const DEFAULT_SEARCH_MAX_TOKENS: u32 = 2048;
/// Default writer max tokens. Reports run to several pages.
const DEFAULT_WRITER_MAX_TOKENS: u32 = 16384;
/// Default email composer max tokens.
const DEFAULT_EMAIL_MAX_TOKENS: u32 = 8192;
/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default per-search timeout in seconds, retries included.
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;

/// Default `SendGrid` send endpoint.
pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";
/// Subject used when the composer returns none.
pub const DEFAULT_EMAIL_SUBJECT: &str = "Deep Research Report";

/// Configuration for the LLM-backed agents.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider for planning, writing and email composition.
    pub provider: String,
    /// Provider used by the search agent.
    pub search_provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (proxies, compatible APIs).
    pub base_url: Option<String>,
    /// Planner and clarifier model.
    pub planner_model: String,
    /// Search model.
    pub search_model: String,
    /// Writer model.
    pub writer_model: String,
    /// Email composer model.
    pub email_model: String,
    /// Planner max tokens.
    pub planner_max_tokens: u32,
    /// Search max tokens.
    pub search_max_tokens: u32,
    /// Writer max tokens.
    pub writer_max_tokens: u32,
    /// Email composer max tokens.
    pub email_max_tokens: u32,
    /// HTTP timeout of a single request.
    pub timeout: Duration,
    /// Hard limit per search item, retries included.
    pub search_timeout: Duration,
    /// Directory containing prompt template files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    search_provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    planner_model: Option<String>,
    search_model: Option<String>,
    writer_model: Option<String>,
    email_model: Option<String>,
    writer_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    search_timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("DEEPTRACE_PROVIDER").ok();
        }
        if self.search_provider.is_none() {
            self.search_provider = std::env::var("DEEPTRACE_SEARCH_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("DEEPTRACE_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("DEEPTRACE_BASE_URL"))
                .ok();
        }
        if self.planner_model.is_none() {
            self.planner_model = std::env::var("DEEPTRACE_PLANNER_MODEL").ok();
        }
        if self.search_model.is_none() {
            self.search_model = std::env::var("DEEPTRACE_SEARCH_MODEL").ok();
        }
        if self.writer_model.is_none() {
            self.writer_model = std::env::var("DEEPTRACE_WRITER_MODEL").ok();
        }
        if self.email_model.is_none() {
            self.email_model = std::env::var("DEEPTRACE_EMAIL_MODEL").ok();
        }
        if self.timeout.is_none() {
            self.timeout = env_secs("DEEPTRACE_REQUEST_TIMEOUT_SECS");
        }
        if self.search_timeout.is_none() {
            self.search_timeout = env_secs("DEEPTRACE_SEARCH_TIMEOUT_SECS");
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("DEEPTRACE_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the search provider name.
    #[must_use]
    pub fn search_provider(mut self, provider: impl Into<String>) -> Self {
        self.search_provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the planner model.
    #[must_use]
    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.planner_model = Some(model.into());
        self
    }

    /// Sets the search model.
    #[must_use]
    pub fn search_model(mut self, model: impl Into<String>) -> Self {
        self.search_model = Some(model.into());
        self
    }

    /// Sets the writer model.
    #[must_use]
    pub fn writer_model(mut self, model: impl Into<String>) -> Self {
        self.writer_model = Some(model.into());
        self
    }

    /// Sets the email composer model.
    #[must_use]
    pub fn email_model(mut self, model: impl Into<String>) -> Self {
        self.email_model = Some(model.into());
        self
    }

    /// Sets the writer max tokens.
    #[must_use]
    pub const fn writer_max_tokens(mut self, n: u32) -> Self {
        self.writer_max_tokens = Some(n);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the per-search timeout.
    #[must_use]
    pub const fn search_timeout(mut self, duration: Duration) -> Self {
        self.search_timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;
        let provider = self.provider.unwrap_or_else(|| "openai".to_string());

        Ok(AgentConfig {
            search_provider: self.search_provider.unwrap_or_else(|| provider.clone()),
            provider,
            api_key,
            base_url: self.base_url,
            planner_model: self.planner_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            search_model: self
                .search_model
                .unwrap_or_else(|| DEFAULT_SEARCH_MODEL.to_string()),
            writer_model: self.writer_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            email_model: self.email_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            planner_max_tokens: DEFAULT_PLANNER_MAX_TOKENS,
            search_max_tokens: DEFAULT_SEARCH_MAX_TOKENS,
            writer_max_tokens: self.writer_max_tokens.unwrap_or(DEFAULT_WRITER_MAX_TOKENS),
            email_max_tokens: DEFAULT_EMAIL_MAX_TOKENS,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            search_timeout: self
                .search_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}

/// `SendGrid` delivery settings.
#[derive(Clone)]
pub struct EmailConfig {
    /// `SendGrid` API key.
    pub api_key: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject used when the composer returns none.
    pub default_subject: String,
    /// Send endpoint.
    pub endpoint: String,
}

impl EmailConfig {
    /// Reads `SENDGRID_*` variables from the environment.
    ///
    /// Returns `None` unless the API key, sender and recipient are all set,
    /// in which case email delivery is simply not configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Some(Self {
            api_key: get("SENDGRID_API_KEY")?,
            from: get("SENDGRID_FROM")?,
            to: get("SENDGRID_TO")?,
            default_subject: get("SENDGRID_DEFAULT_SUBJECT")
                .unwrap_or_else(|| DEFAULT_EMAIL_SUBJECT.to_string()),
            endpoint: SENDGRID_ENDPOINT.to_string(),
        })
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("default_subject", &self.default_subject)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.search_provider, "openai");
        assert_eq!(config.planner_model, DEFAULT_MODEL);
        assert_eq!(config.search_model, DEFAULT_SEARCH_MODEL);
        assert_eq!(config.search_timeout, Duration::from_secs(60));
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_builder_missing_api_key() {
        assert!(matches!(
            AgentConfig::builder().build(),
            Err(AgentError::ApiKeyMissing)
        ));
        assert!(AgentConfig::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .search_provider("openai")
            .writer_model("gpt-5")
            .search_timeout(Duration::from_secs(5))
            .prompt_dir("/tmp/prompts")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.search_provider, "openai");
        assert_eq!(config.writer_model, "gpt-5");
        assert_eq!(config.search_timeout, Duration::from_secs(5));
        assert_eq!(config.prompt_dir, Some(PathBuf::from("/tmp/prompts")));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_email_requires_all_credentials() {
        assert!(EmailConfig::from_lookup(lookup(&[])).is_none());
        assert!(
            EmailConfig::from_lookup(lookup(&[
                ("SENDGRID_API_KEY", "sg"),
                ("SENDGRID_FROM", "a@example.com"),
            ]))
            .is_none()
        );
    }

    #[test]
    fn test_email_config_complete() {
        let config = EmailConfig::from_lookup(lookup(&[
            ("SENDGRID_API_KEY", "sg"),
            ("SENDGRID_FROM", "a@example.com"),
            ("SENDGRID_TO", "b@example.com"),
        ]))
        .unwrap_or_else(|| unreachable!());
        assert_eq!(config.default_subject, DEFAULT_EMAIL_SUBJECT);
        assert_eq!(config.endpoint, SENDGRID_ENDPOINT);
        assert!(!format!("{config:?}").contains("sg\""));
    }
}
