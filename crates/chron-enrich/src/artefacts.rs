//! Reading input artefacts and writing the output set.
//!
//! Outputs are staged as temp files next to their targets and only persisted
//! once every file has been staged. Replaced files are kept as `.bak` until
//! the whole set is in place, and restored if any persist fails.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chron_config::PathsConfig;
use chron_core::entities::{Collection, EnrichedEpisode, Episode, Series, Umbrella};
use chron_schema::SchemaRegistry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::cache::SeriesCache;
use crate::error::EnrichError;

fn read_text(path: &Path) -> Result<Option<String>, EnrichError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EnrichError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T, EnrichError> {
    serde_json::from_str(text).map_err(|source| EnrichError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an optional JSON input. A missing file yields the default value.
///
/// # Errors
///
/// Returns [`EnrichError::Io`] or [`EnrichError::Parse`].
pub fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, EnrichError> {
    read_text(path)?.map_or_else(|| Ok(T::default()), |text| parse(&text, path))
}

/// Read and validate the episode catalogue.
///
/// Every record must match the `episode` schema; slugs must be non-empty and
/// both episode numbers and slugs unique. Episodes come back sorted by number.
///
/// # Errors
///
/// Any violation is fatal: [`EnrichError::Io`], [`EnrichError::Parse`],
/// [`EnrichError::Schema`], or [`EnrichError::InvalidCatalogue`].
pub fn load_catalogue(path: &Path, schemas: &SchemaRegistry) -> Result<Vec<Episode>, EnrichError> {
    let text = read_text(path)?.ok_or_else(|| EnrichError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "episode catalogue not found"),
    })?;

    let records: Vec<serde_json::Value> = parse(&text, path)?;
    schemas.validate_each("episode", &records)?;

    let mut episodes: Vec<Episode> = records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|source| EnrichError::Parse {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect::<Result<_, _>>()?;

    check_catalogue(&episodes)?;
    episodes.sort_by_key(|e| e.episode);
    Ok(episodes)
}

/// Reject empty slugs and duplicate numbers or slugs.
///
/// # Errors
///
/// Returns [`EnrichError::InvalidCatalogue`] naming the first violation.
pub fn check_catalogue(episodes: &[Episode]) -> Result<(), EnrichError> {
    let mut numbers = HashSet::new();
    let mut slugs = HashSet::new();

    for episode in episodes {
        if episode.slug.trim().is_empty() {
            return Err(EnrichError::InvalidCatalogue(format!(
                "episode {} has an empty slug",
                episode.episode
            )));
        }
        if !numbers.insert(episode.episode) {
            return Err(EnrichError::InvalidCatalogue(format!(
                "duplicate episode number {}",
                episode.episode
            )));
        }
        if !slugs.insert(episode.slug.as_str()) {
            return Err(EnrichError::InvalidCatalogue(format!(
                "duplicate slug {:?}",
                episode.slug
            )));
        }
    }

    Ok(())
}

/// Pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`EnrichError::Encode`] when serialization fails.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<String, EnrichError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| EnrichError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    Ok(text)
}

/// The complete output of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Artefacts {
    /// `None` when the episode artefact is not rewritten.
    pub episodes: Option<Vec<EnrichedEpisode>>,
    pub series: Vec<Series>,
    pub collections: Vec<Collection>,
    pub umbrellas: Vec<Umbrella>,
    pub cache: SeriesCache,
}

impl Artefacts {
    /// Validate the series, collection and umbrella lists against their schemas.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Schema`] on the first failing list.
    pub fn validate(&self, schemas: &SchemaRegistry) -> Result<(), EnrichError> {
        let series: Vec<_> = self.series.iter().map(to_value).collect::<Result<_, _>>()?;
        let collections: Vec<_> = self.collections.iter().map(to_value).collect::<Result<_, _>>()?;
        let umbrellas: Vec<_> = self.umbrellas.iter().map(to_value).collect::<Result<_, _>>()?;

        schemas.validate_each("series", &series)?;
        schemas.validate_each("collection", &collections)?;
        schemas.validate_each("umbrella", &umbrellas)?;
        Ok(())
    }

    /// Write every artefact, all or nothing. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Encode`] or [`EnrichError::Persist`].
    pub fn write(&self, paths: &PathsConfig) -> Result<Vec<PathBuf>, EnrichError> {
        let mut outputs: Vec<(&Path, String)> = Vec::with_capacity(5);
        if let Some(episodes) = &self.episodes {
            outputs.push((paths.episodes.as_path(), to_pretty_json(episodes, &paths.episodes)?));
        }
        outputs.push((paths.series.as_path(), to_pretty_json(&self.series, &paths.series)?));
        outputs.push((
            paths.collections.as_path(),
            to_pretty_json(&self.collections, &paths.collections)?,
        ));
        outputs.push((paths.umbrellas.as_path(), to_pretty_json(&self.umbrellas, &paths.umbrellas)?));
        outputs.push((paths.cache.as_path(), to_pretty_json(&self.cache, &paths.cache)?));

        let staged = outputs
            .into_iter()
            .map(|(path, text)| stage(path, &text).map(|file| (path, file)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut committed: Vec<Committed<'_>> = Vec::with_capacity(staged.len());
        for (path, file) in staged {
            match commit(path, file) {
                Ok(done) => committed.push(done),
                Err(error) => {
                    roll_back(&committed);
                    return Err(error);
                }
            }
        }

        let mut written = Vec::with_capacity(committed.len());
        for done in committed {
            if let Some(backup) = &done.backup {
                if let Err(error) = std::fs::remove_file(backup) {
                    tracing::warn!(path = %backup.display(), %error, "could not remove backup");
                }
            }
            tracing::debug!(path = %done.path.display(), "wrote artefact");
            written.push(done.path.to_path_buf());
        }
        Ok(written)
    }
}

/// An artefact moved into place, with the file it replaced.
struct Committed<'a> {
    path: &'a Path,
    backup: Option<PathBuf>,
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Move the current file aside, then persist the staged one over it.
fn commit(path: &Path, file: NamedTempFile) -> Result<Committed<'_>, EnrichError> {
    let persist_err = |source: std::io::Error| EnrichError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let backup = if path.is_file() {
        let backup = backup_path(path);
        std::fs::rename(path, &backup).map_err(persist_err)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = file.persist(path) {
        if let Some(backup) = &backup {
            restore(path, backup);
        }
        return Err(persist_err(e.error));
    }
    Ok(Committed { path, backup })
}

/// Undo committed artefacts, newest first.
fn roll_back(committed: &[Committed<'_>]) {
    for done in committed.iter().rev() {
        match &done.backup {
            Some(backup) => restore(done.path, backup),
            None => {
                if let Err(error) = std::fs::remove_file(done.path) {
                    tracing::warn!(path = %done.path.display(), %error, "could not remove new artefact");
                }
            }
        }
    }
}

fn restore(path: &Path, backup: &Path) {
    if let Err(error) = std::fs::rename(backup, path) {
        tracing::warn!(path = %path.display(), %error, "could not restore previous artefact");
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, EnrichError> {
    serde_json::to_value(value).map_err(|source| EnrichError::Encode {
        path: PathBuf::new(),
        source,
    })
}

/// Write `text` to a temp file in the target's directory.
fn stage(path: &Path, text: &str) -> Result<NamedTempFile, EnrichError> {
    let persist_err = |source: std::io::Error| EnrichError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(persist_err)?;

    let mut file = NamedTempFile::new_in(dir).map_err(persist_err)?;
    file.write_all(text.as_bytes()).map_err(persist_err)?;
    file.flush().map_err(persist_err)?;
    Ok(file)
}
