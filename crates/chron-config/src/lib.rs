//! # chron-config
//!
//! Layered configuration loading for Chronicle using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CHRONICLE_*` prefix, `__` as separator)
//! 2. Project-level `./chronicle.toml`
//! 3. User-level `~/.config/chronicle/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CHRONICLE_MODEL__API_KEY` -> `model.api_key`,
//! `CHRONICLE_PATHS__CACHE` -> `paths.cache`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use chron_config::ChronicleConfig;
//!
//! let config = ChronicleConfig::load_with_dotenv().expect("config");
//! if !config.model.is_configured() {
//!     println!("model calls will be skipped");
//! }
//! ```

mod error;
mod model;
mod paths;

pub use error::ConfigError;
pub use model::ModelConfig;
pub use paths::PathsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-local config file.
pub const PROJECT_CONFIG_FILE: &str = "chronicle.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChronicleConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl ChronicleConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration for a project rooted at `root`.
    ///
    /// Reads `<root>/.env` if present and `<root>/chronicle.toml` as the
    /// project layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_path(root.join(".env"));
        let config: Self = Self::figment_at(root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain for the working directory.
    ///
    /// Public so tests can add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_at(Path::new(""))
    }

    /// Build the figment provider chain with the project layer under `root`.
    #[must_use]
    pub fn figment_at(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = root.join(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("CHRONICLE_").split("__"))
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero attempts or zero concurrency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.model.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.concurrency".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chronicle").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChronicleConfig::default();
        assert!(!config.model.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = ChronicleConfig::default();
        config.model.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "model.concurrency"));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut config = ChronicleConfig::default();
        config.model.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
