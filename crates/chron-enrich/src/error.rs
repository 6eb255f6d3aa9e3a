//! Enrichment pipeline error types.
//!
//! Only fatal conditions are errors. Per-seed model failures and missing
//! credentials are counted in the run summary instead.

use std::path::PathBuf;

use chron_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// Reading an input artefact failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An input artefact is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The episode catalogue parsed but violates its constraints.
    #[error("invalid episode catalogue: {0}")]
    InvalidCatalogue(String),

    /// The cache matches neither the current nor the legacy shape.
    #[error("corrupt cache {}: not a current cache ({modern}) nor a legacy cache ({legacy})", path.display())]
    CorruptCache {
        path: PathBuf,
        modern: String,
        legacy: String,
    },

    /// An outgoing artefact failed schema validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The run was cancelled while model calls were in flight.
    #[error("run cancelled")]
    Cancelled,

    /// An outgoing artefact could not be serialized.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Writing an artefact failed.
    #[error("failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}
