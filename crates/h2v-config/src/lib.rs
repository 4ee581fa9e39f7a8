//! # h2v-config
//!
//! Layered configuration loading for html2vec using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`HTML2VEC_*` prefix, `__` as separator)
//! 2. Project-level `.html2vec/config.toml`
//! 3. User-level `~/.config/html2vec/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HTML2VEC_MODEL__ROUNDS` -> `model.rounds`,
//! `HTML2VEC_EMBEDDINGS__BACKEND` -> `embeddings.backend`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use h2v_config::H2vConfig;
//!
//! let config = H2vConfig::load_with_dotenv().expect("config");
//! println!("propagating {} rounds", config.model.rounds);
//! ```

mod embeddings;
mod error;
mod fetch;
mod model;

pub use embeddings::{EmbeddingBackend, EmbeddingsConfig};
pub use error::ConfigError;
pub use fetch::FetchConfig;
pub use model::ModelConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct H2vConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl H2vConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".html2vec/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("HTML2VEC_").split("__"))
    }

    /// Reject values that would make a fit meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embeddings.hash_dimension == 0 {
            return Err(ConfigError::InvalidValue {
                field: "embeddings.hash_dimension".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("html2vec").join("config.toml"))
    }
}
