//! Serde roundtrip and JsonSchema validation tests for artefact types.

use std::collections::BTreeMap;

use chron_core::entities::*;
use chron_core::enums::*;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn columbus_series() -> Series {
    Series {
        key: "columbus".into(),
        title: "Columbus".into(),
        umbrella_key: "age-of-exploration".into(),
        umbrella_title: "Age of Exploration".into(),
        episodes: vec![10, 11, 13],
        slugs: vec!["columbus-1".into(), "columbus-2".into(), "columbus-3".into()],
        parts: vec![1, 2, 3],
        year_primary: Some(1492),
        year_from: Some(1492),
        year_to: Some(1504),
        scope: Scope::Range,
        confidence: Some(0.85),
        singleton: false,
        source: Source::Llm,
    }
}

roundtrip_and_validate!(series_roundtrip, Series, columbus_series());

roundtrip_and_validate!(
    unknown_singleton_roundtrip,
    Series,
    Series {
        key: "mailbag".into(),
        title: "Mailbag".into(),
        umbrella_key: "mailbag".into(),
        umbrella_title: "Mailbag".into(),
        episodes: vec![99],
        slugs: vec!["mailbag".into()],
        parts: vec![1],
        year_primary: None,
        year_from: None,
        year_to: None,
        scope: Scope::Unknown,
        confidence: None,
        singleton: true,
        source: Source::Rules,
    }
);

roundtrip_and_validate!(
    collection_roundtrip,
    Collection,
    Collection::from(&columbus_series())
);

roundtrip_and_validate!(
    umbrella_roundtrip,
    Umbrella,
    Umbrella {
        key: "age-of-exploration".into(),
        title: "Age of Exploration".into(),
        series_keys: vec!["columbus".into(), "magellan".into()],
        years: YearBounds {
            min: Some(1492),
            max: Some(1522),
        },
        count: 2,
    }
);

roundtrip_and_validate!(
    cache_entry_roundtrip,
    CacheEntry,
    CacheEntry {
        version: CacheVersion::SeriesV2,
        title: "Columbus".into(),
        umbrella: Some("Age of Exploration".into()),
        year_primary: Some(1492),
        year_from: Some(1492),
        year_to: Some(1504),
        scope: Scope::Range,
        confidence: Some(0.85),
        source: Source::Mixed,
    }
);

roundtrip_and_validate!(
    judgement_roundtrip,
    SeriesJudgement,
    SeriesJudgement {
        series_title: "The Vikings".into(),
        umbrella_title: "Medieval Europe".into(),
        year_primary: Some(900),
        year_from: Some(793),
        year_to: Some(1066),
        scope: Scope::Broad,
        confidence: 0.7,
    }
);

roundtrip_and_validate!(
    episode_roundtrip,
    Episode,
    Episode {
        episode: 10,
        slug: "columbus-1".into(),
        title_feed: Some("Columbus Part I".into()),
        title_sheet: None,
        description: "Setting sail.".into(),
        pub_date: Some("2021-03-01".into()),
        year_primary: Some(1492),
        year_from: None,
        year_to: None,
        scope: Some(Scope::Point),
        year_confidence: Some(0.6),
        extra: BTreeMap::from([("duration".to_string(), serde_json::json!(3600))]),
    }
);

#[test]
fn cache_version_serializes_as_literal_tag() {
    let value = serde_json::to_value(CacheVersion::SeriesV2).unwrap();
    assert_eq!(value, serde_json::json!(CACHE_VERSION));
}

#[test]
fn judgement_schema_rejects_bad_scope_and_float_years() {
    let schema = serde_json::to_value(schema_for!(SeriesJudgement)).unwrap();
    let bad = serde_json::json!({
        "seriesTitle": "X",
        "umbrellaTitle": "Y",
        "yearPrimary": 1492.5,
        "yearFrom": null,
        "yearTo": null,
        "scope": "decade",
        "confidence": 0.5
    });
    let errors = validate_against_schema(&schema, &bad);
    assert!(errors.len() >= 2, "expected scope and year errors: {errors:?}");
}
