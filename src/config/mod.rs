//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROUTINE_ENGINE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use skin_routine_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cache TTL: {:?}", config.cache.ttl());
//! ```

mod cache;
mod catalog;
mod engine;
mod error;
mod explainer;
mod telemetry;

pub use cache::{CacheConfig, CacheProvider};
pub use catalog::{CatalogConfig, CatalogSource};
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use explainer::ExplainerConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

use crate::application::AnalyzeRoutineSettings;

/// Root application configuration
///
/// Every section has defaults; only the catalog location must be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Analysis tunables and request timeouts
    #[serde(default)]
    pub engine: EngineConfig,

    /// Analysis cache backend
    #[serde(default)]
    pub cache: CacheConfig,

    /// Catalog source and rule graph refresh
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Explanation service
    #[serde(default)]
    pub explainer: ExplainerConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROUTINE_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ROUTINE_ENGINE__ENGINE__DEFAULT_ABSORPTION_WAIT_MINUTES=2`
    /// - `ROUTINE_ENGINE__CATALOG__SNAPSHOT_PATH=catalog.yaml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROUTINE_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.cache.validate()?;
        self.catalog.validate()?;
        self.explainer.validate()?;
        Ok(())
    }

    /// Pipeline settings derived from the engine, cache and explainer sections.
    pub fn analyze_settings(&self) -> AnalyzeRoutineSettings {
        AnalyzeRoutineSettings {
            cache_ttl: self.cache.ttl(),
            cache_timeout: self.cache.timeout(),
            request_timeout: self.engine.request_timeout(),
            single_flight_wait: self.engine.single_flight_wait(),
            explainer_timeout: self.explainer.timeout(),
            explainer_max_findings: self.explainer.max_findings,
        }
    }
}
