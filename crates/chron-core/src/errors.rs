//! Cross-cutting error types for Chronicle.
//!
//! Domain-specific errors (e.g., `LlmError`, `EnrichError`) are defined in
//! their respective crates. They converge into `anyhow` in `chron-cli`.

use thiserror::Error;

/// Errors that can be raised by any Chronicle crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
