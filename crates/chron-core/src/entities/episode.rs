use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Scope;
use crate::text::non_empty;

/// A catalogue episode as produced by the feed/sheet join.
///
/// Read-only to the pipeline. Fields this crate does not model are kept in
/// `extra` and written back out untouched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode: u32,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_feed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_sheet: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_primary: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_to: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Episode {
    /// The title used for arc detection: the sheet title wins over the feed title.
    #[must_use]
    pub fn preferred_title(&self) -> Option<&str> {
        non_empty(self.title_sheet.as_deref()).or_else(|| non_empty(self.title_feed.as_deref()))
    }

    /// Display title, falling back to `Episode <n>`.
    #[must_use]
    pub fn display_title(&self) -> String {
        self.preferred_title()
            .map_or_else(|| format!("Episode {}", self.episode), str::to_string)
    }

    /// Publish date parsed from RFC 3339, RFC 2822, or a bare `YYYY-MM-DD`.
    #[must_use]
    pub fn published_on(&self) -> Option<NaiveDate> {
        let raw = non_empty(self.pub_date.as_deref())?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    }

    /// Whether the episode carries any prior-generation year signal.
    #[must_use]
    pub const fn has_year_signal(&self) -> bool {
        self.year_primary.is_some() || self.year_from.is_some() || self.year_to.is_some()
    }
}

/// An episode stamped with its resolved series.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEpisode {
    #[serde(flatten)]
    pub episode: Episode,
    pub series_key: String,
    pub series_title: String,
    pub series_part: u32,
    pub umbrella_key: String,
}
