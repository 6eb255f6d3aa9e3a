//! Series seeds: validated arcs plus one singleton per unclaimed episode.

use std::collections::{BTreeMap, HashSet};

use chron_core::entities::Episode;
use chron_core::enums::SeedSource;

use crate::century::CenturyLabels;
use crate::detect::DetectedArc;

/// One member of a seed with its century label, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedMember {
    pub episode: Episode,
    pub century: Option<String>,
}

/// A provisional grouping awaiting key and year resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSeed {
    /// Kebab-cased stem for arcs, the episode slug for singletons.
    pub detection_key: String,
    /// Provisional display title.
    pub stem: String,
    pub source: SeedSource,
    /// Members ordered by episode number.
    pub members: Vec<SeedMember>,
    /// 1-based part numbers, parallel to `members`.
    pub parts: Vec<u32>,
    pub first_episode: u32,
}

impl SeriesSeed {
    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        matches!(self.source, SeedSource::Singleton)
    }

    #[must_use]
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.members.iter().any(|m| m.episode.slug == slug)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.episode.slug.as_str())
    }

    /// Distinct century labels in member order.
    #[must_use]
    pub fn centuries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.members
            .iter()
            .filter_map(|m| m.century.clone())
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }
}

/// Merge arcs and leftover episodes into seeds sorted by first episode number.
///
/// This order is the canonical first-seen order for key assignment.
#[must_use]
pub fn build_seeds(
    episodes: &[Episode],
    arcs: BTreeMap<String, DetectedArc>,
    centuries: &CenturyLabels,
) -> Vec<SeriesSeed> {
    let member = |episode: Episode| SeedMember {
        century: centuries.get(episode.episode).map(str::to_string),
        episode,
    };

    let claimed: HashSet<u32> = arcs
        .values()
        .flat_map(|arc| arc.episodes.iter().map(|e| e.episode))
        .collect();

    let mut seeds: Vec<SeriesSeed> = arcs
        .into_iter()
        .map(|(key, arc)| SeriesSeed {
            first_episode: arc.episodes.first().map_or(0, |e| e.episode),
            detection_key: key,
            stem: arc.stem,
            source: SeedSource::Multi,
            members: arc.episodes.into_iter().map(member).collect(),
            parts: arc.parts,
        })
        .collect();

    seeds.extend(
        episodes
            .iter()
            .filter(|episode| !claimed.contains(&episode.episode))
            .map(|episode| SeriesSeed {
                detection_key: episode.slug.clone(),
                stem: episode.display_title(),
                source: SeedSource::Singleton,
                first_episode: episode.episode,
                members: vec![member(episode.clone())],
                parts: vec![1],
            }),
    );

    seeds.sort_by(|a, b| {
        a.first_episode
            .cmp(&b.first_episode)
            .then_with(|| a.detection_key.cmp(&b.detection_key))
    });
    seeds
}
