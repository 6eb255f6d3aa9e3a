use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Aggregate year span of an umbrella.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct YearBounds {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// A thematic supergroup of series. Rebuilt from the series list every run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Umbrella {
    pub key: String,
    pub title: String,
    pub series_keys: Vec<String>,
    pub years: YearBounds,
    pub count: usize,
}

/// Manual override for an umbrella, keyed by the umbrella key it replaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UmbrellaOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
