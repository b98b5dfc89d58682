//! Catalog source configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Where the catalog is read from
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    #[default]
    Yaml,
    Postgres,
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSource,

    /// YAML catalog document, required for the yaml source
    pub snapshot_path: Option<PathBuf>,

    /// PostgreSQL connection URL, required for the postgres source
    pub database_url: Option<String>,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Rule graph rebuild period in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl CatalogConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("catalog.refresh_interval_secs"));
        }
        match self.source {
            CatalogSource::Yaml => {
                if self.snapshot_path.is_none() {
                    return Err(ValidationError::MissingRequired("CATALOG__SNAPSHOT_PATH"));
                }
            }
            CatalogSource::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .filter(|url| !url.is_empty())
                    .ok_or(ValidationError::MissingRequired("CATALOG__DATABASE_URL"))?;
                if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
                if self.max_connections == 0 || self.max_connections > 100 {
                    return Err(ValidationError::InvalidPoolSize);
                }
            }
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::default(),
            snapshot_path: None,
            database_url: None,
            max_connections: default_max_connections(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_refresh_interval() -> u64 {
    3600
}
