//! Retry schedule for model calls.
//!
//! Attempts are driven by an explicit bounded loop in the client; this module
//! only computes how long to wait between them.

use std::time::Duration;

use chron_config::ModelConfig;

/// Configuration for retry behavior on failed model calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&ModelConfig> for RetryConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl RetryConfig {
    /// Delay after the given failed attempt (1-based): the base delay doubled
    /// once per previous retry, capped at `max_delay`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Delay after a rate-limited attempt: at least the backoff delay, and at
    /// least the server's `Retry-After`, still capped at `max_delay`.
    #[must_use]
    pub fn delay_after_rate_limit(&self, attempt: u32, retry_after_secs: u64) -> Duration {
        self.delay_after(attempt)
            .max(Duration::from_secs(retry_after_secs).min(self.max_delay))
    }
}
