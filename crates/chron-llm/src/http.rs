//! Status handling for chat-completion responses.
//!
//! Completion endpoints report failures as `{"error": {"message": ...}}`.
//! Only that message, cut to [`ERROR_EXCERPT_CHARS`], is kept in
//! [`LlmError::Api`]; a non-JSON body is kept as trimmed text instead.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::LlmError;

/// Wait applied to a 429 that carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest error excerpt kept from a failed response body.
pub const ERROR_EXCERPT_CHARS: usize = 300;

/// Pass a successful response through; turn any other status into an error.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = retry_after_secs(resp.headers(), Utc::now());
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(status, retry_after, &body))
}

fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        };
    }
    LlmError::Api {
        status: status.as_u16(),
        message: error_excerpt(body),
    }
}

/// `Retry-After` as delay-seconds or an HTTP date. A date in the past means
/// no wait.
fn retry_after_secs(headers: &HeaderMap, now: DateTime<Utc>) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = at.with_timezone(&Utc) - now;
    Some(u64::try_from(wait.num_seconds()).unwrap_or(0))
}

fn error_excerpt(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.chars().count() <= ERROR_EXCERPT_CHARS {
        return message;
    }
    let mut excerpt: String = message.chars().take(ERROR_EXCERPT_CHARS).collect();
    excerpt.push('…');
    excerpt
}
