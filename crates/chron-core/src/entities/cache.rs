use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Scope, Source};

/// Literal version tag carried by every current-generation cache entry.
pub const CACHE_VERSION: &str = "series-v2";

/// Cache schema generation. Deserialization fails for any other tag, which is
/// how stale generations are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CacheVersion {
    #[default]
    #[serde(rename = "series-v2")]
    SeriesV2,
}

/// One series-keyed inference cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub version: CacheVersion,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umbrella: Option<String>,
    pub year_primary: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub scope: Scope,
    pub confidence: Option<f64>,
    pub source: Source,
}

/// One episode-keyed entry of the legacy cache format.
///
/// Never written; only read once for promotion into series-level entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEntry {
    #[serde(default, alias = "seriesTitle")]
    pub title: Option<String>,
    #[serde(default, alias = "umbrellaTitle")]
    pub umbrella: Option<String>,
    #[serde(default, alias = "year_primary")]
    pub year_primary: Option<i32>,
    #[serde(default, alias = "year_from")]
    pub year_from: Option<i32>,
    #[serde(default, alias = "year_to")]
    pub year_to: Option<i32>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub confidence: Option<f64>,
}
