//! # chron-llm
//!
//! Language-model client for Chronicle.
//!
//! Asks an OpenAI-compatible chat-completion endpoint for a structured
//! judgement of one series seed (title, umbrella, year span, scope,
//! confidence). The client:
//! - gates concurrency with a shared semaphore (default 2 in-flight calls),
//! - bounds every attempt with a timeout enforced through a cancellation token,
//! - retries failed attempts with exponential backoff,
//! - validates the structured output against the `series_judgement` schema.
//!
//! Callers depend on the [`SeriesJudge`] trait so tests can substitute a
//! scripted judge.

mod error;
mod http;
mod prompt;
mod retry;

pub use error::LlmError;
pub use prompt::{EpisodeContext, JudgeRequest};
pub use retry::RetryConfig;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chron_config::ModelConfig;
use chron_core::entities::SeriesJudgement;
use chron_schema::SchemaRegistry;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Anything that can produce a series judgement for a seed.
pub trait SeriesJudge: Sync {
    /// Request a judgement for one seed.
    fn judge(
        &self,
        request: &JudgeRequest,
    ) -> impl Future<Output = Result<SeriesJudgement, LlmError>> + Send;
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the chat-completion service.
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    retry: RetryConfig,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
    schemas: SchemaRegistry,
}

impl LlmClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] when no api key is set, or
    /// [`LlmError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &ModelConfig) -> Result<Self, LlmError> {
        if !config.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("chronicle/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            timeout: config.timeout(),
            retry: RetryConfig::from(config),
            gate: Arc::new(Semaphore::new(config.concurrency.max(1))),
            cancel: CancellationToken::new(),
            schemas: SchemaRegistry::new(),
        })
    }

    /// Share an external cancellation token. Cancelling it aborts in-flight
    /// attempts and pending backoff sleeps with [`LlmError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// One attempt: wait for a gate permit, then race the request against the
    /// per-attempt timeout and the cancellation token.
    async fn attempt(&self, request: &JudgeRequest) -> Result<SeriesJudgement, LlmError> {
        let _permit = tokio::select! {
            () = self.cancel.cancelled() => return Err(LlmError::Cancelled),
            permit = self.gate.acquire() => permit.map_err(|_| LlmError::Cancelled)?,
        };

        let attempt_token = self.cancel.child_token();
        tokio::select! {
            biased;
            () = attempt_token.cancelled() => Err(LlmError::Cancelled),
            () = tokio::time::sleep(self.timeout) => {
                attempt_token.cancel();
                Err(LlmError::Timeout { after: self.timeout })
            }
            result = self.complete(request) => result,
        }
    }

    async fn complete(&self, request: &JudgeRequest) -> Result<SeriesJudgement, LlmError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request.chat_body(&self.model))
            .send()
            .await?;
        let resp = http::check_response(resp).await?;
        let body = resp.text().await?;

        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidOutput(format!("completion envelope: {e}")))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyContent)?;

        parse_judgement(&content, &self.schemas)
    }

    async fn backoff(&self, delay: Duration) -> Result<(), LlmError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(LlmError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

impl SeriesJudge for LlmClient {
    async fn judge(&self, request: &JudgeRequest) -> Result<SeriesJudgement, LlmError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match self.attempt(request).await {
                Ok(judgement) => return Ok(judgement),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => error,
            };

            tracing::warn!(
                stem = %request.stem,
                attempt,
                max_attempts,
                %error,
                "model call attempt failed"
            );

            if attempt >= max_attempts {
                return Err(LlmError::Exhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = match &error {
                LlmError::RateLimited { retry_after_secs } => {
                    self.retry.delay_after_rate_limit(attempt, *retry_after_secs)
                }
                _ => self.retry.delay_after(attempt),
            };
            self.backoff(delay).await?;
            attempt += 1;
        }
    }
}

/// Parse and validate the model's message content into a judgement.
///
/// # Errors
///
/// Returns [`LlmError::InvalidOutput`] when the content is not JSON, does not
/// match the `series_judgement` schema, or fails the range checks.
pub fn parse_judgement(
    content: &str,
    schemas: &SchemaRegistry,
) -> Result<SeriesJudgement, LlmError> {
    let value: serde_json::Value = serde_json::from_str(prompt::strip_code_fence(content))
        .map_err(|e| LlmError::InvalidOutput(format!("not JSON: {e}")))?;

    schemas
        .validate("series_judgement", &value)
        .map_err(|e| LlmError::InvalidOutput(e.to_string()))?;

    let judgement: SeriesJudgement =
        serde_json::from_value(value).map_err(|e| LlmError::InvalidOutput(e.to_string()))?;
    judgement
        .validate()
        .map_err(|e| LlmError::InvalidOutput(e.to_string()))?;

    Ok(judgement.trimmed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chron_core::enums::Scope;

    fn schemas() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn new_requires_api_key() {
        let result = LlmClient::new(&ModelConfig::default());
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[test]
    fn new_builds_endpoint_without_double_slash() {
        let config = ModelConfig {
            api_key: "sk-test".into(),
            base_url: "http://localhost:9999/v1/".into(),
            ..Default::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn parse_judgement_accepts_fenced_json() {
        let content = "```json\n{\"seriesTitle\":\" Columbus \",\"umbrellaTitle\":\"Age of Exploration\",\"yearPrimary\":1492,\"yearFrom\":1492,\"yearTo\":1504,\"scope\":\"range\",\"confidence\":0.9}\n```";
        let judgement = parse_judgement(content, &schemas()).unwrap();
        assert_eq!(judgement.series_title, "Columbus");
        assert_eq!(judgement.scope, Scope::Range);
        assert_eq!(judgement.year_to, Some(1504));
    }

    #[test]
    fn parse_judgement_rejects_confidence_above_one() {
        let content = r#"{"seriesTitle":"A","umbrellaTitle":"B","yearPrimary":null,"yearFrom":null,"yearTo":null,"scope":"unknown","confidence":1.5}"#;
        assert!(matches!(
            parse_judgement(content, &schemas()),
            Err(LlmError::InvalidOutput(_))
        ));
    }

    #[test]
    fn parse_judgement_rejects_unknown_scope() {
        let content = r#"{"seriesTitle":"A","umbrellaTitle":"B","yearPrimary":1,"yearFrom":1,"yearTo":1,"scope":"era","confidence":0.5}"#;
        assert!(parse_judgement(content, &schemas()).is_err());
    }

    #[test]
    fn parse_judgement_rejects_prose() {
        assert!(matches!(
            parse_judgement("I think this is about Columbus.", &schemas()),
            Err(LlmError::InvalidOutput(_))
        ));
    }
}
