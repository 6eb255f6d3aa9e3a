//! Language-model client error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while asking the model for a series judgement.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No bearer credential is configured.
    #[error("model client is not configured (missing api key)")]
    NotConfigured,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The service returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A single attempt exceeded its time budget.
    #[error("model call timed out after {after:?}")]
    Timeout {
        /// The per-attempt budget that elapsed.
        after: Duration,
    },

    /// The response carried no message content.
    #[error("model response had no content")]
    EmptyContent,

    /// The content failed JSON parsing or structured-output validation.
    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    /// The call was cancelled through the client's cancellation token.
    #[error("model call cancelled")]
    Cancelled,

    /// Every attempt failed.
    #[error("model call failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: Box<LlmError>,
    },
}

impl LlmError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::NotConfigured | Self::Cancelled | Self::Exhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(LlmError::EmptyContent.is_retryable());
        assert!(LlmError::InvalidOutput("x".into()).is_retryable());
        assert!(
            LlmError::Timeout {
                after: Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(
            LlmError::Api {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!LlmError::Cancelled.is_retryable());
        assert!(!LlmError::NotConfigured.is_retryable());
    }
}
