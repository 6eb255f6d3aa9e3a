//! Scope, provenance, and detection enums for Chronicle.
//!
//! All enums serialize in lowercase, matching the artefact format consumed by
//! the front end.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounds at least this many years apart are considered a broad span.
pub const BROAD_SPAN_YEARS: i32 = 100;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Precision class of a resolved date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// A single year.
    Point,
    /// A bounded range of years.
    Range,
    /// A century-scale span.
    Broad,
    /// No usable year signal.
    Unknown,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Range => "range",
            Self::Broad => "broad",
            Self::Unknown => "unknown",
        }
    }

    /// Derive a scope from resolved bounds.
    ///
    /// One bound, or two equal bounds, is a point. Bounds at least
    /// [`BROAD_SPAN_YEARS`] apart are broad.
    #[must_use]
    pub fn from_bounds(from: Option<i32>, to: Option<i32>) -> Self {
        match (from, to) {
            (None, None) => Self::Unknown,
            (Some(_), None) | (None, Some(_)) => Self::Point,
            (Some(a), Some(b)) if a == b => Self::Point,
            (Some(a), Some(b)) if (b - a).abs() >= BROAD_SPAN_YEARS => Self::Broad,
            (Some(_), Some(_)) => Self::Range,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Provenance of a series' final year data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rules,
    Llm,
    Override,
    Mixed,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Llm => "llm",
            Self::Override => "override",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SeedSource
// ---------------------------------------------------------------------------

/// How a series seed was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    /// A validated multi-part arc.
    Multi,
    /// A single episode that belongs to no arc.
    Singleton,
}

impl SeedSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multi => "multi",
            Self::Singleton => "singleton",
        }
    }
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
