//! One enrichment run: inputs → seeds → resolved series → artefacts.
//!
//! Everything except the model calls is sequential. Calls are issued in seed
//! order and awaited together; the judge implementation bounds how many are in
//! flight. Key assignment then walks the seeds in first-seen order.

use std::collections::{BTreeMap, HashMap};

use chron_config::PathsConfig;
use chron_core::entities::{CacheEntry, Collection, EnrichedEpisode, Episode, Series, SeriesJudgement};
use chron_core::enums::Source;
use chron_llm::{EpisodeContext, JudgeRequest, LlmError, SeriesJudge};
use chron_schema::SchemaRegistry;
use futures_util::future::join_all;
use serde::Serialize;

use crate::artefacts::{Artefacts, load_catalogue, read_optional};
use crate::cache::{CacheLookup, LoadedCache, SeriesCache, load_cache, previous_keys};
use crate::century::CenturyLabels;
use crate::detect::detect_arcs;
use crate::error::EnrichError;
use crate::keys::KeyAllocator;
use crate::resolve::{Evidence, LOW_CONFIDENCE_THRESHOLD, resolve_seed};
use crate::seeds::{SeriesSeed, build_seeds};
use crate::umbrella::{UmbrellaOverrides, assign_umbrella, build_umbrellas};

/// Run flags. All default to off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute everything but write nothing.
    pub dry_run: bool,
    /// Ask the model again for seeds that have cached or legacy data.
    /// Only applies where a call can actually be made.
    pub refresh: bool,
    /// Never call the model.
    pub cache_only: bool,
    /// Leave the episode artefact untouched.
    pub series_only: bool,
    /// Restrict model calls to the seed containing this episode slug.
    pub only_slug: Option<String>,
}

impl RunOptions {
    /// Whether the slug filter lets this seed reach the model.
    #[must_use]
    pub fn targets(&self, seed: &SeriesSeed) -> bool {
        self.only_slug
            .as_deref()
            .is_none_or(|slug| seed.contains_slug(slug))
    }
}

/// Everything a run reads, already parsed.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub episodes: Vec<Episode>,
    /// The previous run's series artefact, used only to recover keys.
    pub previous: Vec<Series>,
    pub centuries: CenturyLabels,
    pub overrides: UmbrellaOverrides,
    pub cache: LoadedCache,
}

impl RunInputs {
    /// Load every input artefact.
    ///
    /// Missing optional inputs are empty. An unreadable previous series
    /// artefact is ignored with a warning; keys are then derived afresh.
    ///
    /// # Errors
    ///
    /// Fails on an invalid catalogue, a corrupt cache, or malformed century
    /// or override tables.
    pub fn load(paths: &PathsConfig, schemas: &SchemaRegistry) -> Result<Self, EnrichError> {
        let episodes = load_catalogue(&paths.catalogue, schemas)?;
        let previous = read_optional::<Vec<Series>>(&paths.series).unwrap_or_else(|error| {
            tracing::warn!(%error, "ignoring previous series artefact");
            Vec::new()
        });

        Ok(Self {
            episodes,
            previous,
            centuries: read_optional(&paths.centuries)?,
            overrides: read_optional(&paths.umbrella_overrides)?,
            cache: load_cache(&paths.cache)?,
        })
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub episodes: usize,
    pub series: usize,
    pub singletons: usize,
    /// Model calls issued, successful or not.
    pub model_calls: usize,
    /// Seeds that needed a call but had no credentials or ran cache-only.
    pub skipped_calls: usize,
    /// Calls that failed after all retries.
    pub failed_calls: usize,
    pub cache_hits: usize,
    pub umbrellas: usize,
    /// Series with no confidence or one below the blending threshold.
    pub low_confidence: usize,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub artefacts: Artefacts,
}

/// How a seed gets its evidence.
#[derive(Debug)]
enum Plan<'a> {
    Cached(&'a CacheEntry),
    /// Ask the model; a refreshed seed keeps its cached entry in case the call fails.
    Call(Option<&'a CacheEntry>),
    Skipped,
    Rules,
}

fn plan_seed<'a, J>(
    seed: &SeriesSeed,
    lookup: &'a CacheLookup,
    judge: Option<&J>,
    options: &RunOptions,
) -> Plan<'a> {
    let targeted = options.targets(seed);
    let can_call = targeted && !options.cache_only && judge.is_some();
    let cached = lookup.get(seed);

    if let Some(entry) = cached {
        if !(options.refresh && can_call) {
            return Plan::Cached(entry);
        }
    }
    if !targeted {
        return Plan::Rules;
    }
    if !can_call {
        return Plan::Skipped;
    }
    Plan::Call(cached)
}

/// Model request for a seed: its stem, member episodes, and century labels.
#[must_use]
pub fn judge_request(seed: &SeriesSeed) -> JudgeRequest {
    JudgeRequest {
        stem: seed.stem.clone(),
        episodes: seed
            .members
            .iter()
            .map(|m| EpisodeContext {
                number: m.episode.episode,
                title: m.episode.display_title(),
                description: m.episode.description.clone(),
            })
            .collect(),
        centuries: seed.centuries(),
    }
}

/// Run detection, resolution and aggregation over loaded inputs.
///
/// Nothing is written here; see [`run`].
///
/// # Errors
///
/// Returns [`EnrichError::Cancelled`] if any model call was cancelled, or
/// [`EnrichError::Schema`] if the produced artefacts fail validation.
pub async fn enrich<J: SeriesJudge>(
    inputs: RunInputs,
    judge: Option<&J>,
    options: &RunOptions,
    schemas: &SchemaRegistry,
) -> Result<RunOutput, EnrichError> {
    let RunInputs {
        episodes,
        previous,
        centuries,
        overrides,
        cache,
    } = inputs;

    let arcs = detect_arcs(&episodes);
    let seeds = build_seeds(&episodes, arcs, &centuries);
    let lookup = CacheLookup::new(cache, &seeds, previous_keys(&previous));
    tracing::info!(
        episodes = episodes.len(),
        seeds = seeds.len(),
        promoted = lookup.promoted_count(),
        "built series seeds"
    );

    let plans: Vec<Plan<'_>> = seeds
        .iter()
        .map(|seed| plan_seed(seed, &lookup, judge, options))
        .collect();

    let mut judged = call_model(&seeds, &plans, judge).await;
    if judged
        .values()
        .any(|result| matches!(result, Err(LlmError::Cancelled)))
    {
        return Err(EnrichError::Cancelled);
    }

    let mut summary = RunSummary {
        episodes: episodes.len(),
        ..RunSummary::default()
    };
    let mut keys = KeyAllocator::new();
    let mut refreshed = SeriesCache::new();
    let mut series = Vec::with_capacity(seeds.len());

    for (idx, (seed, plan)) in seeds.iter().zip(&plans).enumerate() {
        let outcome = judged.remove(&idx);
        let evidence = match (plan, &outcome) {
            (&Plan::Cached(entry), _) => {
                summary.cache_hits += 1;
                Evidence::Cached(entry)
            }
            (Plan::Call(_), Some(Ok(judgement))) => {
                summary.model_calls += 1;
                Evidence::Judged(judgement)
            }
            (Plan::Call(fallback), Some(Err(error))) => {
                summary.model_calls += 1;
                summary.failed_calls += 1;
                tracing::warn!(
                    seed = %seed.detection_key,
                    %error,
                    kept_cached = fallback.is_some(),
                    "model resolution unavailable"
                );
                (*fallback).map_or(Evidence::None, Evidence::Cached)
            }
            (Plan::Skipped, _) => {
                summary.skipped_calls += 1;
                Evidence::None
            }
            (Plan::Call(_) | Plan::Rules, _) => Evidence::None,
        };

        let resolution = resolve_seed(seed, evidence);
        let key = keys.assign(&resolution.title, &seed.detection_key, seed.first_episode);
        let umbrella = assign_umbrella(resolution.umbrella_title(), &key, &overrides);
        tracing::debug!(
            seed = %seed.detection_key,
            %key,
            source = %resolution.source,
            scope = %resolution.span.scope,
            "resolved series"
        );

        if let Some(entry) = resolution.to_cache_entry() {
            refreshed.insert(key.clone(), entry);
        }

        series.push(Series {
            key,
            title: resolution.title,
            umbrella_key: umbrella.key,
            umbrella_title: umbrella.title,
            episodes: seed.members.iter().map(|m| m.episode.episode).collect(),
            slugs: seed.slugs().map(str::to_string).collect(),
            parts: seed.parts.clone(),
            year_primary: resolution.span.primary,
            year_from: resolution.span.from,
            year_to: resolution.span.to,
            scope: resolution.span.scope,
            confidence: resolution.span.confidence,
            singleton: seed.is_singleton(),
            source: if umbrella.overridden {
                Source::Override
            } else {
                resolution.source
            },
        });
    }

    if summary.skipped_calls > 0 && !options.cache_only {
        tracing::warn!(
            skipped = summary.skipped_calls,
            "no model credentials configured; unresolved series fall back to rules"
        );
    }

    let enriched = stamp_episodes(&episodes, &series);
    series.sort_by(|a, b| a.key.cmp(&b.key));
    let collections: Vec<Collection> = series
        .iter()
        .filter(|s| !s.singleton)
        .map(Collection::from)
        .collect();
    let umbrellas = build_umbrellas(&series);

    summary.series = series.len();
    summary.singletons = series.iter().filter(|s| s.singleton).count();
    summary.umbrellas = umbrellas.len();
    summary.low_confidence = series
        .iter()
        .filter(|s| s.confidence.is_none_or(|c| c < LOW_CONFIDENCE_THRESHOLD))
        .count();

    let artefacts = Artefacts {
        episodes: (!options.series_only).then_some(enriched),
        series,
        collections,
        umbrellas,
        cache: refreshed,
    };
    artefacts.validate(schemas)?;

    Ok(RunOutput { summary, artefacts })
}

/// Issue every planned call in seed order and collect results by seed index.
async fn call_model<J: SeriesJudge>(
    seeds: &[SeriesSeed],
    plans: &[Plan<'_>],
    judge: Option<&J>,
) -> HashMap<usize, Result<SeriesJudgement, LlmError>> {
    let Some(judge) = judge else {
        return HashMap::new();
    };

    let pending: Vec<(usize, JudgeRequest)> = seeds
        .iter()
        .zip(plans)
        .enumerate()
        .filter(|(_, (_, plan))| matches!(plan, Plan::Call(_)))
        .map(|(idx, (seed, _))| (idx, judge_request(seed)))
        .collect();
    if pending.is_empty() {
        return HashMap::new();
    }

    tracing::info!(calls = pending.len(), "requesting model judgements");
    join_all(
        pending
            .into_iter()
            .map(|(idx, request)| async move { (idx, judge.judge(&request).await) }),
    )
    .await
    .into_iter()
    .collect()
}

/// Stamp every catalogue episode with its series. Output follows episode number.
fn stamp_episodes(episodes: &[Episode], series: &[Series]) -> Vec<EnrichedEpisode> {
    let by_slug: BTreeMap<&str, (&Series, u32)> = series
        .iter()
        .flat_map(|s| {
            s.slugs
                .iter()
                .zip(&s.parts)
                .map(move |(slug, part)| (slug.as_str(), (s, *part)))
        })
        .collect();

    let mut enriched: Vec<EnrichedEpisode> = episodes
        .iter()
        .filter_map(|episode| {
            let (s, part) = by_slug.get(episode.slug.as_str())?;
            Some(EnrichedEpisode {
                episode: Episode {
                    year_primary: s.year_primary,
                    year_from: s.year_from,
                    year_to: s.year_to,
                    scope: Some(s.scope),
                    year_confidence: s.confidence,
                    ..episode.clone()
                },
                series_key: s.key.clone(),
                series_title: s.title.clone(),
                series_part: *part,
                umbrella_key: s.umbrella_key.clone(),
            })
        })
        .collect();
    enriched.sort_by_key(|e| e.episode.episode);
    enriched
}

/// Load inputs, enrich, and write the artefacts unless this is a dry run.
///
/// Nothing is written when any step fails.
///
/// # Errors
///
/// Any fatal input, validation, or write error.
pub async fn run<J: SeriesJudge>(
    paths: &PathsConfig,
    judge: Option<&J>,
    options: &RunOptions,
) -> Result<RunOutput, EnrichError> {
    let schemas = SchemaRegistry::new();
    let inputs = RunInputs::load(paths, &schemas)?;
    let output = enrich(inputs, judge, options, &schemas).await?;

    if options.dry_run {
        tracing::info!("dry run; no artefacts written");
    } else {
        let written = output.artefacts.write(paths)?;
        tracing::info!(files = written.len(), "artefacts written");
    }

    Ok(output)
}
