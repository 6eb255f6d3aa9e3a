//! Central schema registry for Chronicle artefacts.
//!
//! The `SchemaRegistry` builds JSON Schemas from chron-core types at
//! construction time using [`schemars::schema_for!`] and validates values via
//! `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Central store of all JSON Schemas used by the pipeline.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a registry containing every artefact schema plus the model
    /// judgement schema.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on a `schemars`-generated
    /// schema, which `schemars` output never triggers in practice.
    #[must_use]
    pub fn new() -> Self {
        use chron_core::entities::{
            CacheEntry, Collection, EnrichedEpisode, Episode, Series, SeriesJudgement, Umbrella,
        };

        let mut schemas = HashMap::new();

        register!(schemas, "episode", Episode);
        register!(schemas, "enriched_episode", EnrichedEpisode);
        register!(schemas, "series", Series);
        register!(schemas, "collection", Collection);
        register!(schemas, "umbrella", Umbrella);
        register!(schemas, "cache_entry", CacheEntry);
        register!(schemas, "series_judgement", SeriesJudgement);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        self.validate_each(name, std::slice::from_ref(instance))
    }

    /// Validate every value against one named schema, compiling it once.
    ///
    /// Errors are prefixed with the index of the offending value.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate`].
    pub fn validate_each(
        &self,
        name: &str,
        instances: &[serde_json::Value],
    ) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = instances
            .iter()
            .enumerate()
            .flat_map(|(idx, instance)| {
                validator
                    .iter_errors(instance)
                    .map(move |e| format!("[{idx}] {e}"))
                    .collect::<Vec<_>>()
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                schema: name.to_string(),
                errors,
            })
        }
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
