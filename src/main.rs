use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use skin_routine_engine::adapters::{
    DisabledExplainer, HttpExplainerConfig, HttpFindingExplainer, InMemoryAnalysisCache, InMemoryCatalog,
    PostgresCatalogReader, RedisAnalysisCache,
};
use skin_routine_engine::application::{AnalysisError, AnalyzeRoutineHandler, RefreshError, RuleGraphRefresher};
use skin_routine_engine::config::{AppConfig, CacheConfig, CacheProvider, CatalogSource, ConfigError};
use skin_routine_engine::domain::analysis::RoutineRequest;
use skin_routine_engine::domain::foundation::ErrorCode;
use skin_routine_engine::domain::rule_graph::RuleGraphHandle;
use skin_routine_engine::ports::{AnalysisCache, CatalogError, CatalogReader, ExplainerError, FindingExplainer};
use skin_routine_engine::telemetry;

#[derive(Parser)]
#[command(
    name = "skin-routine-engine",
    version,
    about = "Ingredient conflict detection and skincare routine scheduling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a routine request (JSON) and print the result as JSON
    Analyze {
        /// Path to the request file
        request: PathBuf,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },
    /// Build the rule graph from the configured catalog and report its size
    CheckCatalog,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Explainer(#[from] ExplainerError),

    #[error("rule graph build failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("{code}: {source}")]
    Analysis { code: String, source: AnalysisError },
}

impl From<AnalysisError> for CliError {
    fn from(source: AnalysisError) -> Self {
        CliError::Analysis {
            code: source.code().to_string(),
            source,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    telemetry::init(&config.telemetry);

    let catalog = build_catalog(&config).await?;
    let refresher = RuleGraphRefresher::new(
        Arc::clone(&catalog),
        RuleGraphHandle::new(),
        config.catalog.refresh_interval(),
    );
    let graph = refresher.refresh_once().await?;

    match cli.command {
        Commands::CheckCatalog => {
            println!(
                "rule graph {}: {} ingredients, {} rules, {} sensitivities",
                graph.version(),
                graph.ingredient_count(),
                graph.rule_count(),
                graph.sensitivity_count()
            );
            Ok(())
        }
        Commands::Analyze { request, pretty } => {
            let request = read_request(&request).await?;
            let handler = AnalyzeRoutineHandler::new(
                refresher.handle().clone(),
                catalog,
                build_cache(&config.cache).await,
                build_explainer(&config)?,
                config.engine.policy(),
                config.analyze_settings(),
            );

            let outcome = handler.handle(request).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&outcome.result)?
            } else {
                serde_json::to_string(&outcome.result)?
            };
            println!("{json}");
            Ok(())
        }
    }
}

async fn read_request(path: &Path) -> Result<RoutineRequest, CliError> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

async fn build_catalog(config: &AppConfig) -> Result<Arc<dyn CatalogReader>, CliError> {
    let catalog: Arc<dyn CatalogReader> = match config.catalog.source {
        CatalogSource::Yaml => {
            let path = config
                .catalog
                .snapshot_path
                .as_deref()
                .ok_or(CatalogError::Unavailable("no snapshot path configured".to_string()))?;
            Arc::new(InMemoryCatalog::from_yaml_file(path).await?)
        }
        CatalogSource::Postgres => {
            let url = config
                .catalog
                .database_url
                .as_deref()
                .ok_or(CatalogError::Unavailable("no database URL configured".to_string()))?;
            Arc::new(PostgresCatalogReader::connect(url, config.catalog.max_connections).await?)
        }
    };
    Ok(catalog)
}

/// A Redis cache that cannot be reached degrades to the in-process cache.
async fn build_cache(config: &CacheConfig) -> Arc<dyn AnalysisCache> {
    match (config.provider, config.redis_url.as_deref()) {
        (CacheProvider::Redis, Some(url)) => match RedisAnalysisCache::connect(url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(
                    code = %ErrorCode::CacheUnavailable,
                    error = %e,
                    "Redis cache unreachable, falling back to in-memory cache"
                );
                Arc::new(InMemoryAnalysisCache::new())
            }
        },
        (CacheProvider::Redis, None) => {
            tracing::warn!(
                code = %ErrorCode::CacheUnavailable,
                "no Redis URL configured, falling back to in-memory cache"
            );
            Arc::new(InMemoryAnalysisCache::new())
        }
        (CacheProvider::Memory, _) => Arc::new(InMemoryAnalysisCache::new()),
    }
}

fn build_explainer(config: &AppConfig) -> Result<Arc<dyn FindingExplainer>, CliError> {
    let explainer = &config.explainer;
    match (explainer.enabled, explainer.base_url.as_deref(), explainer.api_key.as_ref()) {
        (true, Some(base_url), Some(api_key)) => {
            use secrecy::ExposeSecret;
            let http_config =
                HttpExplainerConfig::new(base_url, api_key.expose_secret().as_str()).with_timeout(explainer.timeout());
            Ok(Arc::new(HttpFindingExplainer::new(http_config)?))
        }
        _ => Ok(Arc::new(DisabledExplainer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skin_routine_engine::domain::foundation::{ProductId, TimeOfDay};
    use skin_routine_engine::domain::profile::{SkinType, UserProfile};
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_redis_falls_back_to_memory() {
        let config = CacheConfig {
            provider: CacheProvider::Redis,
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            ..CacheConfig::default()
        };

        let cache = tokio::time::timeout(Duration::from_secs(5), build_cache(&config))
            .await
            .unwrap();

        let fingerprint = RoutineRequest::new(UserProfile::new(SkinType::Normal))
            .with_product(ProductId::new(1).unwrap(), TimeOfDay::Morning)
            .fingerprint()
            .unwrap();
        assert!(matches!(cache.get(&fingerprint).await, Ok(None)));
    }
}
