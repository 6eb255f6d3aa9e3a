//! Year/scope resolution for a single seed.
//!
//! A seed resolves from a cached entry or a fresh model judgement when one is
//! available, otherwise from rule-based signals on its own episodes
//! (prior-generation year fields, then century labels). Model-derived results
//! below [`LOW_CONFIDENCE_THRESHOLD`] are replaced by the rule fallback when
//! one exists. Every result is normalized before it leaves this module.

use chron_core::entities::{CacheEntry, CacheVersion, SeriesJudgement};
use chron_core::enums::{Scope, Source};
use chron_core::text::non_empty;

use crate::century::century_span;
use crate::seeds::SeriesSeed;

/// Model confidence below this is blended with the rule fallback.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Confidence for promoted legacy aggregates that carried none.
pub const LEGACY_FALLBACK_CONFIDENCE: f64 = 0.35;

/// Confidence for spans derived only from century labels.
pub const CENTURY_FALLBACK_CONFIDENCE: f64 = 0.2;

/// Year fields plus scope and confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearSpan {
    pub primary: Option<i32>,
    pub from: Option<i32>,
    pub to: Option<i32>,
    pub scope: Scope,
    pub confidence: Option<f64>,
}

impl YearSpan {
    pub const UNKNOWN: Self = Self {
        primary: None,
        from: None,
        to: None,
        scope: Scope::Unknown,
        confidence: None,
    };

    /// Enforce the numeric invariants.
    ///
    /// - `point` collapses all three fields to one value.
    /// - `range` fills a missing bound from the other.
    /// - Reversed bounds are swapped and `primary` is clamped between them.
    /// - `point`/`range` without any value becomes `unknown`.
    /// - Confidence is clamped to `[0, 1]` and rounded to three decimals.
    #[must_use]
    pub fn normalized(self) -> Self {
        let Self {
            mut primary,
            mut from,
            mut to,
            mut scope,
            confidence,
        } = self;

        match scope {
            Scope::Point => {
                let value = primary.or(from).or(to);
                (primary, from, to) = (value, value, value);
            }
            Scope::Range => {
                (from, to) = (from.or(to), to.or(from));
            }
            Scope::Broad | Scope::Unknown => {}
        }

        if let (Some(a), Some(b)) = (from, to) {
            let (lo, hi) = if a > b { (b, a) } else { (a, b) };
            (from, to) = (Some(lo), Some(hi));
            primary = primary.map(|p| p.clamp(lo, hi));
        }

        if matches!(scope, Scope::Point | Scope::Range)
            && primary.is_none()
            && from.is_none()
            && to.is_none()
        {
            scope = Scope::Unknown;
        }

        Self {
            primary,
            from,
            to,
            scope,
            confidence: round_confidence(confidence),
        }
    }

    /// Whether the confidence is missing or under the blending threshold.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence.is_none_or(|c| c < LOW_CONFIDENCE_THRESHOLD)
    }
}

/// Clamp to `[0, 1]` and round to three decimals. Non-finite values become `None`.
#[must_use]
pub fn round_confidence(confidence: Option<f64>) -> Option<f64> {
    confidence
        .filter(|c| c.is_finite())
        .map(|c| (c.clamp(0.0, 1.0) * 1000.0).round() / 1000.0)
}

/// Floor of the mean of two years, computed without overflow.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn midpoint(a: i32, b: i32) -> i32 {
    // Lies between `a` and `b`, so it always fits back into `i32`.
    (i64::from(a) + i64::from(b)).div_euclid(2) as i32
}

/// Median of the values. Even-length input takes the floor of the mean of
/// the two middle values.
pub fn median(values: &mut [i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some(midpoint(values[mid - 1], values[mid]))
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rule fallback from the prior-generation year fields on the seed's episodes.
///
/// Returns `None` when no member carries any year value.
#[must_use]
pub fn episode_fallback(seed: &SeriesSeed) -> Option<YearSpan> {
    let episodes: Vec<_> = seed
        .members
        .iter()
        .map(|m| &m.episode)
        .filter(|e| e.has_year_signal())
        .collect();
    if episodes.is_empty() {
        return None;
    }

    let from = episodes
        .iter()
        .filter_map(|e| e.year_from.or(e.year_primary).or(e.year_to))
        .min();
    let to = episodes
        .iter()
        .filter_map(|e| e.year_to.or(e.year_primary).or(e.year_from))
        .max();

    let mut midpoints: Vec<i32> = episodes
        .iter()
        .filter_map(|e| {
            e.year_primary.or_else(|| {
                let lo = e.year_from.or(e.year_to)?;
                let hi = e.year_to.or(e.year_from)?;
                Some(midpoint(lo, hi))
            })
        })
        .collect();

    let scope = majority_scope(episodes.iter().filter_map(|e| e.scope))
        .unwrap_or_else(|| Scope::from_bounds(from, to));

    let confidences: Vec<f64> = episodes.iter().filter_map(|e| e.year_confidence).collect();

    Some(YearSpan {
        primary: median(&mut midpoints),
        from,
        to,
        scope,
        confidence: mean(&confidences),
    })
}

/// Most frequent scope; ties go to the one seen first.
fn majority_scope(scopes: impl Iterator<Item = Scope>) -> Option<Scope> {
    let mut tally: Vec<(Scope, usize)> = Vec::new();
    for scope in scopes {
        match tally.iter_mut().find(|(s, _)| *s == scope) {
            Some((_, count)) => *count += 1,
            None => tally.push((scope, 1)),
        }
    }
    tally
        .into_iter()
        .fold(None, |best: Option<(Scope, usize)>, (scope, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((scope, count)),
        })
        .map(|(scope, _)| scope)
}

/// Rule fallback from the century labels attached to the seed's episodes.
#[must_use]
pub fn century_fallback(seed: &SeriesSeed) -> Option<YearSpan> {
    let spans: Vec<(i32, i32)> = seed
        .centuries()
        .iter()
        .filter_map(|label| century_span(label))
        .collect();
    let from = spans.iter().map(|(from, _)| *from).min()?;
    let to = spans.iter().map(|(_, to)| *to).max()?;

    Some(YearSpan {
        primary: Some(midpoint(from, to)),
        from: Some(from),
        to: Some(to),
        scope: Scope::Broad,
        confidence: Some(CENTURY_FALLBACK_CONFIDENCE),
    })
}

/// Best rule-based span for a seed, if any signal exists.
#[must_use]
pub fn rule_fallback(seed: &SeriesSeed) -> Option<YearSpan> {
    episode_fallback(seed).or_else(|| century_fallback(seed))
}

/// Model-derived evidence available for a seed.
#[derive(Debug, Clone, Copy)]
pub enum Evidence<'a> {
    Cached(&'a CacheEntry),
    Judged(&'a SeriesJudgement),
    None,
}

/// Outcome of resolving one seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub title: String,
    /// Umbrella title as resolved, before overrides.
    pub umbrella: Option<String>,
    pub span: YearSpan,
    pub source: Source,
}

impl Resolution {
    /// Cache entry for this resolution. Only model-derived results are cached.
    #[must_use]
    pub fn to_cache_entry(&self) -> Option<CacheEntry> {
        matches!(self.source, Source::Llm | Source::Mixed).then(|| CacheEntry {
            version: CacheVersion::SeriesV2,
            title: self.title.clone(),
            umbrella: self.umbrella.clone(),
            year_primary: self.span.primary,
            year_from: self.span.from,
            year_to: self.span.to,
            scope: self.span.scope,
            confidence: self.span.confidence,
            source: self.source,
        })
    }

    /// Umbrella title, falling back to the series title.
    #[must_use]
    pub fn umbrella_title(&self) -> &str {
        non_empty(self.umbrella.as_deref()).unwrap_or(&self.title)
    }
}

/// Resolve a seed from its evidence, blending with rules where needed.
#[must_use]
pub fn resolve_seed(seed: &SeriesSeed, evidence: Evidence<'_>) -> Resolution {
    let fallback = rule_fallback(seed);

    let (title, umbrella, span, source) = match evidence {
        Evidence::Cached(entry) => (
            non_empty(Some(entry.title.as_str())).unwrap_or(&seed.stem).to_string(),
            non_empty(entry.umbrella.as_deref()).map(str::to_string),
            YearSpan {
                primary: entry.year_primary,
                from: entry.year_from,
                to: entry.year_to,
                scope: entry.scope,
                confidence: entry.confidence,
            },
            entry.source,
        ),
        Evidence::Judged(judgement) => (
            non_empty(Some(judgement.series_title.as_str())).unwrap_or(&seed.stem).to_string(),
            non_empty(Some(judgement.umbrella_title.as_str())).map(str::to_string),
            YearSpan {
                primary: judgement.year_primary,
                from: judgement.year_from,
                to: judgement.year_to,
                scope: judgement.scope,
                confidence: Some(judgement.confidence),
            },
            Source::Llm,
        ),
        Evidence::None => {
            return Resolution {
                title: seed.stem.clone(),
                umbrella: None,
                span: fallback.unwrap_or(YearSpan::UNKNOWN).normalized(),
                source: Source::Rules,
            };
        }
    };

    let (span, source) = blend(span.normalized(), source, fallback);
    Resolution {
        title,
        umbrella,
        span: span.normalized(),
        source,
    }
}

/// Replace a low-confidence model span with the rule fallback.
///
/// The fallback's bounds, scope and confidence win, the confidence is capped
/// at [`LOW_CONFIDENCE_THRESHOLD`] and the source becomes `mixed`. Without a
/// fallback the model span is kept.
#[must_use]
pub fn blend(span: YearSpan, source: Source, fallback: Option<YearSpan>) -> (YearSpan, Source) {
    match fallback {
        Some(rules) if source == Source::Llm && span.is_low_confidence() => (
            YearSpan {
                confidence: rules.confidence.map(|c| c.min(LOW_CONFIDENCE_THRESHOLD)),
                ..rules
            },
            Source::Mixed,
        ),
        _ => (span, source),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::century::CenturyLabels;
    use crate::seeds::build_seeds;
    use crate::test_support::episode;
    use chron_core::entities::Episode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn span(primary: Option<i32>, from: Option<i32>, to: Option<i32>, scope: Scope) -> YearSpan {
        YearSpan {
            primary,
            from,
            to,
            scope,
            confidence: Some(0.9),
        }
    }

    fn singleton(ep: Episode, labels: &CenturyLabels) -> SeriesSeed {
        build_seeds(&[ep], BTreeMap::new(), labels).remove(0)
    }

    fn judgement(confidence: f64) -> SeriesJudgement {
        SeriesJudgement {
            series_title: "The Printing Press".into(),
            umbrella_title: "Early Modern Europe".into(),
            year_primary: Some(1450),
            year_from: Some(1440),
            year_to: Some(1460),
            scope: Scope::Range,
            confidence,
        }
    }

    #[rstest]
    #[case(span(Some(1492), Some(1400), Some(1500), Scope::Point), (Some(1492), Some(1492), Some(1492), Scope::Point))]
    #[case(span(None, Some(1400), None, Scope::Point), (Some(1400), Some(1400), Some(1400), Scope::Point))]
    #[case(span(None, None, Some(1504), Scope::Range), (None, Some(1504), Some(1504), Scope::Range))]
    #[case(span(Some(1000), Some(1504), Some(1492), Scope::Range), (Some(1492), Some(1492), Some(1504), Scope::Range))]
    #[case(span(None, None, None, Scope::Point), (None, None, None, Scope::Unknown))]
    #[case(span(Some(1600), Some(1400), Some(1500), Scope::Broad), (Some(1500), Some(1400), Some(1500), Scope::Broad))]
    fn normalizes(
        #[case] input: YearSpan,
        #[case] expected: (Option<i32>, Option<i32>, Option<i32>, Scope),
    ) {
        let out = input.normalized();
        assert_eq!((out.primary, out.from, out.to, out.scope), expected);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = span(Some(2000), Some(1504), Some(1492), Scope::Range).normalized();
        assert_eq!(once.normalized(), once);
    }

    #[rstest]
    #[case(Some(1.7), Some(1.0))]
    #[case(Some(-0.2), Some(0.0))]
    #[case(Some(0.66666), Some(0.667))]
    #[case(Some(f64::NAN), None)]
    #[case(None, None)]
    fn rounds_confidence(#[case] input: Option<f64>, #[case] expected: Option<f64>) {
        assert_eq!(round_confidence(input), expected);
    }

    #[test]
    fn median_handles_odd_and_even_lengths() {
        assert_eq!(median(&mut [5, 1, 3]), Some(3));
        assert_eq!(median(&mut [1, 2]), Some(1));
        assert_eq!(median(&mut [-5, -2]), Some(-4));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn extreme_years_do_not_overflow() {
        assert_eq!(median(&mut [2_000_000_000, 2_000_000_000]), Some(2_000_000_000));
        assert_eq!(midpoint(i32::MAX, i32::MAX - 1), i32::MAX - 1);
        assert_eq!(midpoint(i32::MIN, i32::MAX), -1);
    }

    #[test]
    fn episode_fallback_aggregates_member_fields() {
        let mut a = episode(1, "Incas Part 1", "2020-01-01");
        a.year_from = Some(1438);
        a.year_to = Some(1471);
        a.scope = Some(Scope::Range);
        a.year_confidence = Some(0.4);
        let mut b = episode(2, "Incas Part 2", "2020-01-08");
        b.year_primary = Some(1532);
        b.scope = Some(Scope::Point);
        b.year_confidence = Some(0.8);
        let mut c = episode(3, "Incas Part 3", "2020-01-15");
        c.year_from = Some(1533);
        c.year_to = Some(1572);
        c.scope = Some(Scope::Range);

        let episodes = vec![a, b, c];
        let seed = build_seeds(
            &episodes,
            crate::detect::detect_arcs(&episodes),
            &CenturyLabels::default(),
        )
        .remove(0);

        let span = episode_fallback(&seed).unwrap();
        assert_eq!(span.from, Some(1438));
        assert_eq!(span.to, Some(1572));
        assert_eq!(span.primary, Some(1532));
        assert_eq!(span.scope, Scope::Range);
        assert!((span.confidence.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn scope_vote_ties_go_to_first_seen() {
        let votes = [Scope::Point, Scope::Range, Scope::Range, Scope::Point];
        assert_eq!(majority_scope(votes.into_iter()), Some(Scope::Point));
        assert_eq!(majority_scope(std::iter::empty()), None);
    }

    #[test]
    fn century_fallback_is_broad_with_low_confidence() {
        let labels = CenturyLabels::new(BTreeMap::from([(14, "15th century".to_string())]));
        let seed = singleton(episode(14, "The Printing Press", "2021-03-22"), &labels);
        assert!(episode_fallback(&seed).is_none());
        assert_eq!(
            rule_fallback(&seed),
            Some(YearSpan {
                primary: Some(1449),
                from: Some(1400),
                to: Some(1499),
                scope: Scope::Broad,
                confidence: Some(CENTURY_FALLBACK_CONFIDENCE),
            })
        );
    }

    #[test]
    fn no_signal_resolves_to_unknown_rules() {
        let seed = singleton(episode(12, "Mailbag", "2021-03-10"), &CenturyLabels::default());
        let resolution = resolve_seed(&seed, Evidence::None);
        assert_eq!(resolution.title, "Mailbag");
        assert_eq!(resolution.span, YearSpan::UNKNOWN);
        assert_eq!(resolution.source, Source::Rules);
        assert!(resolution.to_cache_entry().is_none());
    }

    #[test]
    fn confident_judgement_is_kept() {
        let labels = CenturyLabels::new(BTreeMap::from([(14, "15th century".to_string())]));
        let seed = singleton(episode(14, "The Printing Press", "2021-03-22"), &labels);
        let judged = judgement(0.9);
        let resolution = resolve_seed(&seed, Evidence::Judged(&judged));
        assert_eq!(resolution.source, Source::Llm);
        assert_eq!(resolution.span.from, Some(1440));
        assert_eq!(resolution.umbrella_title(), "Early Modern Europe");
        assert!(resolution.to_cache_entry().is_some());
    }

    #[test]
    fn low_confidence_judgement_is_replaced_by_rules() {
        let labels = CenturyLabels::new(BTreeMap::from([(14, "15th century".to_string())]));
        let seed = singleton(episode(14, "The Printing Press", "2021-03-22"), &labels);
        let judged = judgement(0.3);
        let resolution = resolve_seed(&seed, Evidence::Judged(&judged));

        assert_eq!(resolution.source, Source::Mixed);
        assert_eq!(resolution.title, "The Printing Press");
        assert_eq!(resolution.span.from, Some(1400));
        assert_eq!(resolution.span.to, Some(1499));
        assert_eq!(resolution.span.scope, Scope::Broad);
        assert_eq!(resolution.span.confidence, Some(CENTURY_FALLBACK_CONFIDENCE));
    }

    #[test]
    fn blended_confidence_is_capped_at_threshold() {
        let rules = YearSpan {
            confidence: Some(0.95),
            ..span(Some(1450), Some(1440), Some(1460), Scope::Range)
        };
        let model = YearSpan {
            confidence: Some(0.1),
            ..span(Some(1800), None, None, Scope::Point)
        };
        let (blended, source) = blend(model, Source::Llm, Some(rules));
        assert_eq!(source, Source::Mixed);
        assert_eq!(blended.confidence, Some(LOW_CONFIDENCE_THRESHOLD));
        assert_eq!(blended.from, Some(1440));
    }

    #[test]
    fn low_confidence_without_fallback_keeps_model_result() {
        let seed = singleton(episode(14, "The Printing Press", "2021-03-22"), &CenturyLabels::default());
        let judged = judgement(0.3);
        let resolution = resolve_seed(&seed, Evidence::Judged(&judged));
        assert_eq!(resolution.source, Source::Llm);
        assert_eq!(resolution.span.confidence, Some(0.3));
    }

    #[test]
    fn cached_entry_round_trips_through_resolution() {
        let seed = singleton(episode(14, "The Printing Press", "2021-03-22"), &CenturyLabels::default());
        let judged = judgement(0.87654);
        let first = resolve_seed(&seed, Evidence::Judged(&judged));
        let entry = first.to_cache_entry().unwrap();
        let second = resolve_seed(&seed, Evidence::Cached(&entry));
        assert_eq!(second, first);
        assert_eq!(second.span.confidence, Some(0.877));
    }
}
