//! Email agent: composes an HTML email from a report and delivers it
//! through the `SendGrid` v3 API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::config::{AgentConfig, EmailConfig};
use super::prompt::build_email_prompt;
use super::provider::LlmProvider;
use super::traits::{Agent, parse_json};
use crate::error::AgentError;
use crate::research::EmailService;

/// What the composer returns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComposedEmail {
    /// Subject line; may be blank.
    #[serde(default)]
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Composes and sends report emails.
pub struct EmailAgent {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
    email: EmailConfig,
    http: reqwest::Client,
}

impl EmailAgent {
    /// Creates an email agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Delivery`] if the HTTP client cannot be built.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: &AgentConfig,
        system_prompt: String,
        email: EmailConfig,
    ) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
            })?;
        Ok(Self {
            provider,
            model: config.email_model.clone(),
            max_tokens: config.email_max_tokens,
            system_prompt,
            email,
            http,
        })
    }

    /// Asks the model for a subject and HTML body.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn compose(&self, markdown: &str) -> Result<ComposedEmail, AgentError> {
        let response = self
            .execute(self.provider.as_ref(), &build_email_prompt(markdown))
            .await?;
        parse_json("email", &response.content)
    }

    /// Posts a composed email to `SendGrid`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Delivery`] on transport failure or a non-2xx status.
    pub async fn deliver(&self, composed: &ComposedEmail) -> Result<(), AgentError> {
        let payload = sendgrid_payload(&self.email, composed);
        let response = self
            .http
            .post(&self.email.endpoint)
            .bearer_auth(&self.email.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AgentError::Delivery {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Delivery {
                message: format!("SendGrid rejected the message: {body}"),
                status: Some(status.as_u16()),
            });
        }

        tracing::info!(status = status.as_u16(), to = %self.email.to, "email delivered");
        Ok(())
    }
}

/// Builds the `SendGrid` v3 `mail/send` body.
///
/// A blank subject falls back to the configured default.
#[must_use]
pub fn sendgrid_payload(email: &EmailConfig, composed: &ComposedEmail) -> serde_json::Value {
    let subject = match composed.subject.trim() {
        "" => email.default_subject.as_str(),
        s => s,
    };
    json!({
        "personalizations": [{ "to": [{ "email": email.to }] }],
        "from": { "email": email.from },
        "subject": subject,
        "content": [{ "type": "text/html", "value": composed.html_body }],
    })
}

impl std::fmt::Debug for EmailAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailAgent")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Agent for EmailAgent {
    fn name(&self) -> &'static str {
        "email"
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
impl EmailService for EmailAgent {
    async fn send(&self, markdown: &str) -> Result<(), AgentError> {
        let composed = self.compose(markdown).await?;
        self.deliver(&composed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::DEFAULT_EMAIL_SUBJECT;
    use crate::agent::testing::{ScriptedProvider, test_config};

    fn email_config() -> EmailConfig {
        EmailConfig::from_lookup(|name| match name {
            "SENDGRID_API_KEY" => Some("sg-key".to_string()),
            "SENDGRID_FROM" => Some("from@example.com".to_string()),
            "SENDGRID_TO" => Some("to@example.com".to_string()),
            _ => None,
        })
        .unwrap_or_else(|| unreachable!())
    }

    #[test]
    fn test_payload_shape() {
        let composed = ComposedEmail {
            subject: "Rust report".to_string(),
            html_body: "<h1>hi</h1>".to_string(),
        };
        let payload = sendgrid_payload(&email_config(), &composed);
        assert_eq!(payload["subject"], "Rust report");
        assert_eq!(payload["from"]["email"], "from@example.com");
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "to@example.com");
        assert_eq!(payload["content"][0]["type"], "text/html");
        assert_eq!(payload["content"][0]["value"], "<h1>hi</h1>");
    }

    #[test]
    fn test_blank_subject_uses_default() {
        let composed = ComposedEmail {
            subject: "  ".to_string(),
            html_body: String::new(),
        };
        let payload = sendgrid_payload(&email_config(), &composed);
        assert_eq!(payload["subject"], DEFAULT_EMAIL_SUBJECT);
    }

    #[tokio::test]
    async fn test_compose_parses_json() {
        let provider = Arc::new(ScriptedProvider::new([Ok(
            r#"{"subject":"Weekly","html_body":"<p>x</p>"}"#,
        )]));
        let agent = EmailAgent::new(provider, &test_config(), String::new(), email_config())
            .unwrap_or_else(|_| unreachable!());
        let composed = agent
            .compose("# Report")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(composed.subject, "Weekly");
        assert_eq!(composed.html_body, "<p>x</p>");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_delivery_error() {
        let provider = Arc::new(ScriptedProvider::new([Ok(
            r#"{"subject":"s","html_body":"b"}"#,
        )]));
        let mut config = email_config();
        config.endpoint = "http://127.0.0.1:9/v3/mail/send".to_string();
        let agent = EmailAgent::new(provider, &test_config(), String::new(), config)
            .unwrap_or_else(|_| unreachable!());
        let result = agent.send("# Report").await;
        assert!(matches!(result, Err(AgentError::Delivery { .. })));
    }
}
