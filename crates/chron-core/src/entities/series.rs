use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Scope, Source};

/// A resolved series: a validated arc or a singleton episode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub key: String,
    pub title: String,
    pub umbrella_key: String,
    pub umbrella_title: String,
    pub episodes: Vec<u32>,
    pub slugs: Vec<String>,
    pub parts: Vec<u32>,
    pub year_primary: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub scope: Scope,
    pub confidence: Option<f64>,
    pub singleton: bool,
    pub source: Source,
}

impl Series {
    /// Best available lower year: `yearFrom`, else `yearPrimary`, else `yearTo`.
    #[must_use]
    pub fn floor_year(&self) -> Option<i32> {
        self.year_from.or(self.year_primary).or(self.year_to)
    }

    /// Best available upper year: `yearTo`, else `yearPrimary`, else `yearFrom`.
    #[must_use]
    pub fn ceiling_year(&self) -> Option<i32> {
        self.year_to.or(self.year_primary).or(self.year_from)
    }

    /// Lowest member episode number.
    #[must_use]
    pub fn first_episode(&self) -> u32 {
        self.episodes.iter().copied().min().unwrap_or(0)
    }
}

/// Browsing view of a multi-episode series.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub key: String,
    pub title: String,
    pub umbrella_key: String,
    pub umbrella_title: String,
    pub episodes: Vec<u32>,
    pub slugs: Vec<String>,
    pub count: usize,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub scope: Scope,
}

impl From<&Series> for Collection {
    fn from(series: &Series) -> Self {
        Self {
            key: series.key.clone(),
            title: series.title.clone(),
            umbrella_key: series.umbrella_key.clone(),
            umbrella_title: series.umbrella_title.clone(),
            episodes: series.episodes.clone(),
            slugs: series.slugs.clone(),
            count: series.episodes.len(),
            year_from: series.year_from,
            year_to: series.year_to,
            scope: series.scope,
        }
    }
}
