//! Collision-free series key assignment.

use std::collections::BTreeSet;

use chron_core::text::kebab_case;

/// Accumulates the keys handed out during one run.
///
/// Seeds must be offered in first-seen order; collision suffixes depend on it.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    used: BTreeSet<String>,
}

impl KeyAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a unique key for a series.
    ///
    /// The base key is the kebab-cased title, else the kebab-cased detection
    /// key, else `series-<first>`. A taken base gets `-e<first>`, then
    /// `-2`, `-3`, ... on top of that until a free key is found.
    pub fn assign(&mut self, title: &str, detection_key: &str, first_episode: u32) -> String {
        let base = [title, detection_key]
            .into_iter()
            .map(kebab_case)
            .find(|key| !key.is_empty())
            .unwrap_or_else(|| format!("series-{first_episode}"));

        let key = if self.used.contains(&base) {
            let with_episode = format!("{base}-e{first_episode}");
            let mut candidate = with_episode.clone();
            let mut suffix = 2u32;
            while self.used.contains(&candidate) {
                candidate = format!("{with_episode}-{suffix}");
                suffix += 1;
            }
            candidate
        } else {
            base
        };

        self.used.insert(key.clone());
        key
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
