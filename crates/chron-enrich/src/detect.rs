//! Multi-part arc detection from episode titles.
//!
//! Titles ending in a `Part <n>` marker (arabic or roman) are bucketed by
//! their slugified stem. A bucket is kept only when the whole run is cohesive;
//! any violation discards the bucket, never part of it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chron_core::entities::Episode;
use chron_core::text::kebab_case;
use regex::Regex;

/// Consecutive arc members may be at most this many episode numbers apart.
pub const MAX_EPISODE_GAP: u32 = 2;

/// Consecutive arc members may be published at most this many days apart.
pub const MAX_PUBLISH_GAP_DAYS: i64 = 21;

static PART_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<stem>.*?)[\s,:;(\[\-\u{2013}\u{2014}]*\bpart\s+(?P<num>\d{1,3}|[ivxlcdm]+)\b")
        .unwrap_or_else(|e| unreachable!("part marker pattern is valid: {e}"))
});

/// A title split into its stem and part number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTitle {
    pub stem: String,
    pub part: u32,
}

/// A validated arc: members ordered by episode number, parts exactly `1..=N`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedArc {
    pub stem: String,
    pub episodes: Vec<Episode>,
    pub parts: Vec<u32>,
}

/// Why a bucket of `Part N` titles was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArcViolation {
    TooFewEpisodes,
    PartSequence { expected: u32, found: u32 },
    EpisodeGap { from: u32, to: u32 },
    PublishGap { from: u32, to: u32, days: i64 },
}

/// Split `"<stem> Part <n>"` into stem and part number.
///
/// Returns `None` when there is no marker, the stem is empty, or the numeral
/// is zero or malformed.
#[must_use]
pub fn parse_part_title(title: &str) -> Option<PartTitle> {
    let caps = PART_MARKER.captures(title)?;
    let stem = caps["stem"]
        .trim()
        .trim_end_matches(|c: char| matches!(c, ',' | ':' | ';' | '-' | '(' | '[' | '\u{2013}' | '\u{2014}'))
        .trim();
    if stem.is_empty() {
        return None;
    }

    let raw = &caps["num"];
    let part = raw
        .parse::<u32>()
        .ok()
        .or_else(|| roman_to_int(raw))
        .filter(|&n| n > 0)?;

    Some(PartTitle {
        stem: stem.to_string(),
        part,
    })
}

/// Convert a roman numeral (case-insensitive) to an integer.
#[must_use]
pub fn roman_to_int(numeral: &str) -> Option<u32> {
    let values: Vec<u32> = numeral
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' => Some(1),
            'V' => Some(5),
            'X' => Some(10),
            'L' => Some(50),
            'C' => Some(100),
            'D' => Some(500),
            'M' => Some(1000),
            _ => None,
        })
        .collect::<Option<_>>()?;

    if values.is_empty() {
        return None;
    }

    let mut total: i64 = 0;
    for (idx, &value) in values.iter().enumerate() {
        let value = i64::from(value);
        match values.get(idx + 1) {
            Some(&next) if i64::from(next) > value => total -= value,
            _ => total += value,
        }
    }

    u32::try_from(total).ok().filter(|&n| n > 0)
}

/// Scan all episodes and return the valid arcs keyed by detection key
/// (the kebab-cased stem).
#[must_use]
pub fn detect_arcs(episodes: &[Episode]) -> BTreeMap<String, DetectedArc> {
    let mut buckets: BTreeMap<String, Vec<(&Episode, PartTitle)>> = BTreeMap::new();

    for episode in episodes {
        let Some(marker) = episode.preferred_title().and_then(parse_part_title) else {
            continue;
        };
        let key = kebab_case(&marker.stem);
        if key.is_empty() {
            continue;
        }
        buckets.entry(key).or_default().push((episode, marker));
    }

    let mut arcs = BTreeMap::new();
    for (key, mut members) in buckets {
        members.sort_by_key(|(episode, _)| episode.episode);

        if let Err(violation) = check_cohesion(&members) {
            tracing::debug!(%key, ?violation, "discarding part bucket");
            continue;
        }

        let stem = members[0].1.stem.clone();
        let parts = members.iter().map(|(_, marker)| marker.part).collect();
        let episodes = members.into_iter().map(|(episode, _)| episode.clone()).collect();
        arcs.insert(key, DetectedArc {
            stem,
            episodes,
            parts,
        });
    }

    arcs
}

/// Validate a bucket already sorted by episode number.
fn check_cohesion(members: &[(&Episode, PartTitle)]) -> Result<(), ArcViolation> {
    if members.len() < 2 {
        return Err(ArcViolation::TooFewEpisodes);
    }

    for (expected, (_, marker)) in (1u32..).zip(members) {
        if marker.part != expected {
            return Err(ArcViolation::PartSequence {
                expected,
                found: marker.part,
            });
        }
    }

    for pair in members.windows(2) {
        let (prev, next) = (pair[0].0, pair[1].0);
        if next.episode - prev.episode > MAX_EPISODE_GAP {
            return Err(ArcViolation::EpisodeGap {
                from: prev.episode,
                to: next.episode,
            });
        }
        // Missing or unparseable dates cannot violate the cadence rule.
        if let (Some(a), Some(b)) = (prev.published_on(), next.published_on()) {
            let days = (b - a).num_days().abs();
            if days > MAX_PUBLISH_GAP_DAYS {
                return Err(ArcViolation::PublishGap {
                    from: prev.episode,
                    to: next.episode,
                    days,
                });
            }
        }
    }

    Ok(())
}
