//! RuleGraphRefresher - Rebuilds the rule graph from full catalog snapshots.
//!
//! Every rebuild replaces the published graph as a whole. A failed rebuild
//! leaves the previous graph serving and is logged as stale.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::ErrorCode;
use crate::domain::rule_graph::{RuleGraph, RuleGraphError, RuleGraphHandle};
use crate::ports::{CatalogError, CatalogReader};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Build(#[from] RuleGraphError),
}

/// Pulls catalog snapshots and publishes rule graphs into a handle.
pub struct RuleGraphRefresher {
    catalog: Arc<dyn CatalogReader>,
    handle: RuleGraphHandle,
    interval: Duration,
}

impl RuleGraphRefresher {
    pub fn new(catalog: Arc<dyn CatalogReader>, handle: RuleGraphHandle, interval: Duration) -> Self {
        Self {
            catalog,
            handle,
            interval,
        }
    }

    pub fn handle(&self) -> &RuleGraphHandle {
        &self.handle
    }

    /// Loads one snapshot and publishes the graph built from it.
    ///
    /// A graph with the same content version as the current one is not
    /// republished.
    pub async fn refresh_once(&self) -> Result<Arc<RuleGraph>, RefreshError> {
        let snapshot = self.catalog.load_snapshot().await?;
        let graph = RuleGraph::build(snapshot)?;

        if let Some(current) = self.handle.current() {
            if current.version() == graph.version() {
                tracing::debug!(version = %current.version(), "rule graph unchanged");
                return Ok(current);
            }
        }

        let published = self.handle.publish(graph);
        tracing::info!(
            version = %published.version(),
            ingredients = published.ingredient_count(),
            rules = published.rule_count(),
            sensitivities = published.sensitivity_count(),
            "published rule graph"
        );
        Ok(published)
    }

    /// Refreshes every interval until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::debug!("rule graph refresher stopped");
                        return;
                    }
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        tracing::warn!(
                            code = %ErrorCode::RuleGraphStale,
                            error = %e,
                            serving = self.handle.current_version().as_deref().unwrap_or("none"),
                            "rule graph rebuild failed, keeping previous snapshot"
                        );
                    }
                }
            }
        }
    }
}
