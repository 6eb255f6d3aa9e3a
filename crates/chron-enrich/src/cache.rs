//! Inference cache loading and legacy promotion.
//!
//! The cache file is resolved once at load time into either the current
//! series-keyed shape or the legacy episode-keyed shape. Legacy entries are
//! then translated into series-level entries per seed before resolution
//! begins, so everything downstream only sees [`CacheEntry`] values.

use std::collections::BTreeMap;
use std::path::Path;

use chron_core::entities::{CacheEntry, CacheVersion, LegacyEntry, Series};
use chron_core::enums::{Scope, Source};
use chron_core::text::non_empty;

use crate::error::EnrichError;
use crate::resolve::{LEGACY_FALLBACK_CONFIDENCE, mean, median, midpoint};
use crate::seeds::SeriesSeed;

/// Current-generation cache keyed by series key.
pub type SeriesCache = BTreeMap<String, CacheEntry>;

/// Legacy cache keyed by episode slug.
pub type LegacyCache = BTreeMap<String, LegacyEntry>;

/// A cache file resolved into exactly one schema generation.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedCache {
    Current(SeriesCache),
    Legacy(LegacyCache),
}

impl Default for LoadedCache {
    fn default() -> Self {
        Self::Current(SeriesCache::new())
    }
}

/// Parse cache text, trying the current shape first and the legacy shape second.
///
/// # Errors
///
/// Returns [`EnrichError::CorruptCache`] when neither shape matches.
pub fn parse_cache(text: &str, path: &Path) -> Result<LoadedCache, EnrichError> {
    let modern = match serde_json::from_str::<SeriesCache>(text) {
        Ok(cache) => return Ok(LoadedCache::Current(cache)),
        Err(e) => e.to_string(),
    };
    match serde_json::from_str::<LegacyCache>(text) {
        Ok(cache) => {
            tracing::info!(entries = cache.len(), path = %path.display(), "loaded legacy cache");
            Ok(LoadedCache::Legacy(cache))
        }
        Err(e) => Err(EnrichError::CorruptCache {
            path: path.to_path_buf(),
            modern,
            legacy: e.to_string(),
        }),
    }
}

/// Load the cache file. A missing file is an empty current cache.
///
/// # Errors
///
/// Returns [`EnrichError::Io`] for unreadable files and
/// [`EnrichError::CorruptCache`] for unrecognised content.
pub fn load_cache(path: &Path) -> Result<LoadedCache, EnrichError> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_cache(&text, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LoadedCache::default()),
        Err(source) => Err(EnrichError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Map every episode slug in the previous run's series artefact to its key.
#[must_use]
pub fn previous_keys(previous: &[Series]) -> BTreeMap<String, String> {
    previous
        .iter()
        .flat_map(|series| {
            series
                .slugs
                .iter()
                .map(move |slug| (slug.clone(), series.key.clone()))
        })
        .collect()
}

/// Cache entries available to each seed, keyed by detection key.
#[derive(Debug, Clone, Default)]
pub struct CacheLookup {
    current: SeriesCache,
    promoted: BTreeMap<String, CacheEntry>,
    previous_keys: BTreeMap<String, String>,
}

impl CacheLookup {
    /// Resolve the loaded cache against this run's seeds, promoting legacy
    /// entries up front.
    #[must_use]
    pub fn new(
        cache: LoadedCache,
        seeds: &[SeriesSeed],
        previous_keys: BTreeMap<String, String>,
    ) -> Self {
        match cache {
            LoadedCache::Current(current) => Self {
                current,
                promoted: BTreeMap::new(),
                previous_keys,
            },
            LoadedCache::Legacy(legacy) => Self {
                current: SeriesCache::new(),
                promoted: seeds
                    .iter()
                    .filter_map(|seed| {
                        promote_legacy(seed, &legacy).map(|entry| (seed.detection_key.clone(), entry))
                    })
                    .collect(),
                previous_keys,
            },
        }
    }

    /// Previous run's series key for any member episode of the seed.
    #[must_use]
    pub fn previous_key(&self, seed: &SeriesSeed) -> Option<&str> {
        seed.slugs()
            .find_map(|slug| self.previous_keys.get(slug))
            .map(String::as_str)
    }

    /// Cached entry for a seed: the current cache under the previous key,
    /// otherwise the promoted legacy aggregate.
    #[must_use]
    pub fn get(&self, seed: &SeriesSeed) -> Option<&CacheEntry> {
        self.previous_key(seed)
            .and_then(|key| self.current.get(key))
            .or_else(|| self.promoted.get(&seed.detection_key))
    }

    /// Number of legacy aggregates produced.
    #[must_use]
    pub fn promoted_count(&self) -> usize {
        self.promoted.len()
    }
}

/// Aggregate the legacy per-episode entries of a seed into one series entry.
///
/// Returns `None` when no member episode has a legacy entry.
#[must_use]
pub fn promote_legacy(seed: &SeriesSeed, legacy: &LegacyCache) -> Option<CacheEntry> {
    let entries: Vec<&LegacyEntry> = seed.slugs().filter_map(|slug| legacy.get(slug)).collect();
    if entries.is_empty() {
        return None;
    }

    let title = entries
        .iter()
        .find_map(|e| non_empty(e.title.as_deref()))
        .unwrap_or(&seed.stem)
        .to_string();
    let umbrella = entries
        .iter()
        .find_map(|e| non_empty(e.umbrella.as_deref()))
        .map(str::to_string);

    let year_from = entries
        .iter()
        .filter_map(|e| e.year_from.or(e.year_primary).or(e.year_to))
        .min();
    let year_to = entries
        .iter()
        .filter_map(|e| e.year_to.or(e.year_primary).or(e.year_from))
        .max();

    let mut primaries: Vec<i32> = entries.iter().filter_map(|e| e.year_primary).collect();
    if primaries.is_empty() {
        primaries = entries
            .iter()
            .filter_map(|e| match (e.year_from, e.year_to) {
                (Some(a), Some(b)) => Some(midpoint(a, b)),
                (a, b) => a.or(b),
            })
            .collect();
    }
    let year_primary = median(&mut primaries);

    let scope = entries
        .iter()
        .find_map(|e| e.scope)
        .unwrap_or_else(|| Scope::from_bounds(year_from, year_to));

    let confidences: Vec<f64> = entries.iter().filter_map(|e| e.confidence).collect();
    let confidence = mean(&confidences).unwrap_or(LEGACY_FALLBACK_CONFIDENCE);

    Some(CacheEntry {
        version: CacheVersion::SeriesV2,
        title,
        umbrella,
        year_primary,
        year_from,
        year_to,
        scope,
        confidence: Some(confidence),
        source: Source::Llm,
    })
}
