//! Input and output artefact locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_catalogue() -> PathBuf {
    PathBuf::from("data/catalogue.json")
}

fn default_centuries() -> PathBuf {
    PathBuf::from("data/centuries.json")
}

fn default_umbrella_overrides() -> PathBuf {
    PathBuf::from("data/umbrella-overrides.json")
}

fn default_episodes() -> PathBuf {
    PathBuf::from("data/episodes.json")
}

fn default_series() -> PathBuf {
    PathBuf::from("data/series.json")
}

fn default_collections() -> PathBuf {
    PathBuf::from("data/collections.json")
}

fn default_umbrellas() -> PathBuf {
    PathBuf::from("data/umbrellas.json")
}

fn default_cache() -> PathBuf {
    PathBuf::from("data/series-cache.json")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Episode catalogue produced by the feed/sheet join (input).
    #[serde(default = "default_catalogue")]
    pub catalogue: PathBuf,

    /// Century labels keyed by episode number (input, optional).
    #[serde(default = "default_centuries")]
    pub centuries: PathBuf,

    /// Umbrella overrides keyed by umbrella key (input, optional).
    #[serde(default = "default_umbrella_overrides")]
    pub umbrella_overrides: PathBuf,

    /// Enriched episode artefact (output).
    #[serde(default = "default_episodes")]
    pub episodes: PathBuf,

    /// Series artefact (output; the previous run's copy is also read).
    #[serde(default = "default_series")]
    pub series: PathBuf,

    /// Collections artefact (output).
    #[serde(default = "default_collections")]
    pub collections: PathBuf,

    /// Umbrella index (output).
    #[serde(default = "default_umbrellas")]
    pub umbrellas: PathBuf,

    /// Inference cache (input and output).
    #[serde(default = "default_cache")]
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalogue: default_catalogue(),
            centuries: default_centuries(),
            umbrella_overrides: default_umbrella_overrides(),
            episodes: default_episodes(),
            series: default_series(),
            collections: default_collections(),
            umbrellas: default_umbrellas(),
            cache: default_cache(),
        }
    }
}

impl PathsConfig {
    /// Rebase every relative path on `root`. Absolute paths are kept.
    #[must_use]
    pub fn rooted(&self, root: &Path) -> Self {
        let rebase = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        };
        Self {
            catalogue: rebase(&self.catalogue),
            centuries: rebase(&self.centuries),
            umbrella_overrides: rebase(&self.umbrella_overrides),
            episodes: rebase(&self.episodes),
            series: rebase(&self.series),
            collections: rebase(&self.collections),
            umbrellas: rebase(&self.umbrellas),
            cache: rebase(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_under_data() {
        let paths = PathsConfig::default();
        assert_eq!(paths.catalogue, PathBuf::from("data/catalogue.json"));
        assert_eq!(paths.cache, PathBuf::from("data/series-cache.json"));
    }

    #[test]
    fn rooted_rebases_relative_paths_only() {
        let root = std::env::temp_dir();
        let absolute = root.join("elsewhere").join("series.json");
        let paths = PathsConfig {
            series: absolute.clone(),
            ..Default::default()
        };
        let rooted = paths.rooted(Path::new("/srv/site"));
        assert_eq!(rooted.catalogue, PathBuf::from("/srv/site/data/catalogue.json"));
        assert_eq!(rooted.series, absolute);
    }
}
