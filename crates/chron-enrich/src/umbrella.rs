//! Umbrella key assignment, manual overrides, and aggregation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chron_core::entities::{Series, Umbrella, UmbrellaOverride, YearBounds};
use chron_core::text::{kebab_case, non_empty};

/// Manual overrides keyed by the umbrella key they replace.
pub type UmbrellaOverrides = BTreeMap<String, UmbrellaOverride>;

/// The umbrella a series lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmbrellaAssignment {
    pub key: String,
    pub title: String,
    pub overridden: bool,
}

/// Derive the umbrella for a series from its resolved umbrella title.
///
/// An override registered under the derived key replaces the key and/or the
/// title.
#[must_use]
pub fn assign_umbrella(
    umbrella_title: &str,
    series_key: &str,
    overrides: &UmbrellaOverrides,
) -> UmbrellaAssignment {
    let derived = Some(kebab_case(umbrella_title))
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| series_key.to_string());

    match overrides.get(&derived) {
        Some(over) => UmbrellaAssignment {
            key: non_empty(over.key.as_deref()).map_or_else(|| derived.clone(), str::to_string),
            title: non_empty(over.title.as_deref()).unwrap_or(umbrella_title).to_string(),
            overridden: true,
        },
        None => UmbrellaAssignment {
            key: derived,
            title: umbrella_title.to_string(),
            overridden: false,
        },
    }
}

/// Order missing years after present ones.
fn cmp_year(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group the final series list into umbrellas.
///
/// Members are ordered by floor year, first episode, then key; umbrellas by
/// minimum year, then key. The title comes from the first member.
#[must_use]
pub fn build_umbrellas(series: &[Series]) -> Vec<Umbrella> {
    let mut groups: BTreeMap<&str, Vec<&Series>> = BTreeMap::new();
    for s in series {
        groups.entry(s.umbrella_key.as_str()).or_default().push(s);
    }

    let mut umbrellas: Vec<Umbrella> = groups
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| {
                cmp_year(a.floor_year(), b.floor_year())
                    .then_with(|| a.first_episode().cmp(&b.first_episode()))
                    .then_with(|| a.key.cmp(&b.key))
            });
            members.dedup_by(|a, b| a.key == b.key);

            let years = YearBounds {
                min: members.iter().filter_map(|s| s.floor_year()).min(),
                max: members.iter().filter_map(|s| s.ceiling_year()).max(),
            };

            Umbrella {
                key: key.to_string(),
                title: members
                    .first()
                    .map_or_else(|| key.to_string(), |s| s.umbrella_title.clone()),
                series_keys: members.iter().map(|s| s.key.clone()).collect(),
                count: members.len(),
                years,
            }
        })
        .collect();

    umbrellas.sort_by(|a, b| cmp_year(a.years.min, b.years.min).then_with(|| a.key.cmp(&b.key)));
    umbrellas
}

#[cfg(test)]
mod tests {
    use super::*;
    use chron_core::enums::{Scope, Source};
    use pretty_assertions::assert_eq;

    fn series(key: &str, umbrella: &str, first: u32, from: Option<i32>, to: Option<i32>) -> Series {
        Series {
            key: key.into(),
            title: key.into(),
            umbrella_key: kebab_case(umbrella),
            umbrella_title: umbrella.into(),
            episodes: vec![first],
            slugs: vec![format!("ep-{first}")],
            parts: vec![1],
            year_primary: None,
            year_from: from,
            year_to: to,
            scope: Scope::from_bounds(from, to),
            confidence: None,
            singleton: true,
            source: Source::Rules,
        }
    }

    #[test]
    fn derives_key_from_title() {
        let assignment = assign_umbrella("Age of Exploration", "columbus", &UmbrellaOverrides::new());
        assert_eq!(
            assignment,
            UmbrellaAssignment {
                key: "age-of-exploration".into(),
                title: "Age of Exploration".into(),
                overridden: false,
            }
        );
    }

    #[test]
    fn blank_title_falls_back_to_series_key() {
        let assignment = assign_umbrella("  ", "mailbag", &UmbrellaOverrides::new());
        assert_eq!(assignment.key, "mailbag");
    }

    #[test]
    fn override_can_rename_key_and_title_independently() {
        let overrides = UmbrellaOverrides::from([
            ("age-of-exploration".to_string(), UmbrellaOverride {
                key: Some("exploration".into()),
                title: Some("Exploration & Empire".into()),
            }),
            ("ancient-rome".to_string(), UmbrellaOverride {
                key: None,
                title: Some("Rome".into()),
            }),
        ]);

        let both = assign_umbrella("Age of Exploration", "columbus", &overrides);
        assert_eq!(both.key, "exploration");
        assert_eq!(both.title, "Exploration & Empire");
        assert!(both.overridden);

        let title_only = assign_umbrella("Ancient Rome", "caesar", &overrides);
        assert_eq!(title_only.key, "ancient-rome");
        assert_eq!(title_only.title, "Rome");
    }

    #[test]
    fn aggregates_and_orders_umbrellas() {
        let list = vec![
            series("napoleon", "Modern Europe", 30, Some(1799), Some(1815)),
            series("columbus", "Age of Exploration", 10, Some(1492), Some(1504)),
            series("magellan", "Age of Exploration", 20, Some(1519), Some(1522)),
            series("cortes", "Age of Exploration", 25, Some(1519), Some(1521)),
            series("mailbag", "Mailbag", 5, None, None),
        ];
        let umbrellas = build_umbrellas(&list);

        let keys: Vec<&str> = umbrellas.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["age-of-exploration", "modern-europe", "mailbag"]);

        let exploration = &umbrellas[0];
        assert_eq!(exploration.series_keys, vec!["columbus", "magellan", "cortes"]);
        assert_eq!(exploration.count, 3);
        assert_eq!(exploration.years, YearBounds {
            min: Some(1492),
            max: Some(1522)
        });

        assert_eq!(umbrellas[2].years, YearBounds::default());
    }

    #[test]
    fn counts_match_member_lists() {
        let list = vec![
            series("a", "X", 1, Some(100), Some(200)),
            series("b", "X", 2, Some(50), None),
        ];
        for umbrella in build_umbrellas(&list) {
            assert_eq!(umbrella.count, umbrella.series_keys.len());
            if let (Some(min), Some(max)) = (umbrella.years.min, umbrella.years.max) {
                assert!(min <= max);
            }
        }
    }
}
