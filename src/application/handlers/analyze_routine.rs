//! AnalyzeRoutineHandler - The routine analysis request pipeline.
//!
//! validate → fingerprint → cache read → single-flight → decompose →
//! analyze → explain → cache write.
//!
//! Only unknown products or allergens, invalid requests, catalog failures,
//! a missing rule graph and the request timeout fail a request. Cache and
//! explainer problems are logged and degrade to recomputation or plain
//! explanations. Failed computations are never cached.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::application::decomposer::{DecomposeError, ProductDecomposer};
use crate::application::single_flight::{Flight, SingleFlight};
use crate::domain::analysis::{
    AnalysisCaveat, AnalysisPolicy, AnalysisResult, ConflictFinding, Fingerprint, RoutineAnalyzer, RoutineRequest,
};
use crate::domain::foundation::{ErrorCode, IngredientId, ProductId, ValidationError};
use crate::domain::rule_graph::{RuleGraph, RuleGraphHandle};
use crate::ports::{AnalysisCache, CacheError, CatalogError, CatalogReader, FindingExplainer};

/// Timing and sizing knobs of the pipeline.
#[derive(Debug, Clone)]
pub struct AnalyzeRoutineSettings {
    pub cache_ttl: Duration,
    /// Bound on one cache read or write. Elapsed counts as unavailable.
    pub cache_timeout: Duration,
    /// Bound on one full computation.
    pub request_timeout: Duration,
    /// How long a duplicate request waits for the in-flight one.
    pub single_flight_wait: Duration,
    pub explainer_timeout: Duration,
    pub explainer_max_findings: usize,
}

impl Default for AnalyzeRoutineSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(1800),
            cache_timeout: Duration::from_millis(250),
            request_timeout: Duration::from_millis(5000),
            single_flight_wait: Duration::from_millis(3000),
            explainer_timeout: Duration::from_millis(1500),
            explainer_max_findings: 5,
        }
    }
}

/// Where a returned result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Computed,
    Cached,
    /// Produced by a concurrent identical request.
    Shared,
}

#[derive(Debug, Clone)]
pub struct AnalyzeRoutineResult {
    pub result: AnalysisResult,
    pub source: ResultSource,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("ingredient {0} not found")]
    IngredientNotFound(IngredientId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("no rule graph has been published")]
    RuleGraphUnavailable,

    #[error("analysis timed out")]
    TimedOut,
}

impl AnalysisError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            AnalysisError::IngredientNotFound(_) => ErrorCode::IngredientNotFound,
            AnalysisError::Validation(_) => ErrorCode::ValidationFailed,
            AnalysisError::Catalog(_) => ErrorCode::CatalogError,
            AnalysisError::RuleGraphUnavailable => ErrorCode::RuleGraphUnavailable,
            AnalysisError::TimedOut => ErrorCode::Timeout,
        }
    }
}

impl From<CatalogError> for AnalysisError {
    fn from(err: CatalogError) -> Self {
        AnalysisError::Catalog(err.to_string())
    }
}

/// Handler for routine analysis requests.
pub struct AnalyzeRoutineHandler {
    graphs: RuleGraphHandle,
    decomposer: ProductDecomposer,
    cache: Arc<dyn AnalysisCache>,
    explainer: Arc<dyn FindingExplainer>,
    policy: AnalysisPolicy,
    settings: AnalyzeRoutineSettings,
    flights: SingleFlight<Fingerprint, AnalysisResult>,
}

impl AnalyzeRoutineHandler {
    pub fn new(
        graphs: RuleGraphHandle,
        catalog: Arc<dyn CatalogReader>,
        cache: Arc<dyn AnalysisCache>,
        explainer: Arc<dyn FindingExplainer>,
        policy: AnalysisPolicy,
        settings: AnalyzeRoutineSettings,
    ) -> Self {
        Self {
            graphs,
            decomposer: ProductDecomposer::new(catalog),
            cache,
            explainer,
            policy,
            settings,
            flights: SingleFlight::new(),
        }
    }

    pub async fn handle(&self, request: RoutineRequest) -> Result<AnalyzeRoutineResult, AnalysisError> {
        // 1. Validate and key the request
        request.validate()?;
        let fingerprint = request.fingerprint()?;

        // 2. Pin the current snapshot for the whole request
        let graph = self.graphs.current().ok_or(AnalysisError::RuleGraphUnavailable)?;
        for allergen in &request.profile.allergens {
            if !graph.contains_ingredient(*allergen) {
                return Err(AnalysisError::IngredientNotFound(*allergen));
            }
        }

        // 3. Read-through cache
        if let Some(result) = self.cached(&fingerprint, &graph).await {
            return Ok(AnalyzeRoutineResult {
                result,
                source: ResultSource::Cached,
            });
        }

        // 4. Collapse concurrent identical requests
        match self.flights.join(fingerprint.clone()) {
            Flight::Leader(guard) => {
                // A previous leader may have stored the result after our read.
                if let Some(result) = self.cached(&fingerprint, &graph).await {
                    guard.complete(result.clone());
                    return Ok(AnalyzeRoutineResult {
                        result,
                        source: ResultSource::Cached,
                    });
                }
                let result = self.compute_and_store(&request, &fingerprint, &graph).await?;
                guard.complete(result.clone());
                Ok(AnalyzeRoutineResult {
                    result,
                    source: ResultSource::Computed,
                })
            }
            Flight::Follower(follower) => {
                tracing::debug!(fingerprint = %fingerprint.short(), "joining in-flight analysis");
                if let Some(result) = follower.wait(self.settings.single_flight_wait).await {
                    return Ok(AnalyzeRoutineResult {
                        result,
                        source: ResultSource::Shared,
                    });
                }

                tracing::warn!(
                    fingerprint = %fingerprint.short(),
                    "in-flight analysis unavailable, computing independently"
                );
                let result = self.compute_and_store(&request, &fingerprint, &graph).await?;
                Ok(AnalyzeRoutineResult {
                    result,
                    source: ResultSource::Computed,
                })
            }
        }
    }

    /// Cached result computed against `graph`, if any.
    async fn cached(&self, fingerprint: &Fingerprint, graph: &RuleGraph) -> Option<AnalysisResult> {
        let read = tokio::time::timeout(self.settings.cache_timeout, self.cache.get(fingerprint))
            .await
            .unwrap_or_else(|_| Err(CacheError::Unavailable("read timed out".to_string())));
        match read {
            Ok(Some(result)) if result.rule_graph_version == graph.version() => {
                tracing::debug!(fingerprint = %fingerprint.short(), "analysis cache hit");
                Some(result)
            }
            Ok(Some(result)) => {
                tracing::debug!(
                    fingerprint = %fingerprint.short(),
                    cached_version = %result.rule_graph_version,
                    current_version = %graph.version(),
                    "cached analysis is from an older rule graph"
                );
                None
            }
            Ok(None) => {
                tracing::debug!(fingerprint = %fingerprint.short(), "analysis cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(code = %ErrorCode::CacheUnavailable, error = %e, "analysis cache read failed");
                None
            }
        }
    }

    async fn compute_and_store(
        &self,
        request: &RoutineRequest,
        fingerprint: &Fingerprint,
        graph: &RuleGraph,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = tokio::time::timeout(self.settings.request_timeout, self.compute(request, fingerprint, graph))
            .await
            .map_err(|_| {
                tracing::warn!(fingerprint = %fingerprint.short(), "analysis timed out");
                AnalysisError::TimedOut
            })??;

        let write = tokio::time::timeout(
            self.settings.cache_timeout,
            self.cache.put(fingerprint, &result, self.settings.cache_ttl),
        )
        .await
        .unwrap_or_else(|_| Err(CacheError::Unavailable("write timed out".to_string())));
        if let Err(e) = write {
            tracing::warn!(code = %ErrorCode::CacheUnavailable, error = %e, "analysis cache write failed");
        }

        tracing::info!(
            fingerprint = %fingerprint.short(),
            findings = result.findings.len(),
            risk = %result.overall_risk,
            rule_graph_version = %result.rule_graph_version,
            "routine analysis completed"
        );
        Ok(result)
    }

    async fn compute(
        &self,
        request: &RoutineRequest,
        fingerprint: &Fingerprint,
        graph: &RuleGraph,
    ) -> Result<AnalysisResult, AnalysisError> {
        let decompositions = join_all(
            request
                .products
                .iter()
                .map(|requested| self.decomposer.decompose(graph, requested)),
        )
        .await;

        let mut products = Vec::with_capacity(decompositions.len());
        let mut caveats = Vec::new();
        for outcome in decompositions {
            match outcome {
                Ok(decomposition) => {
                    if !decomposition.skipped.is_empty() {
                        caveats.push(AnalysisCaveat::SkippedIngredients {
                            product_id: decomposition.product.id(),
                            ingredient_ids: decomposition.skipped,
                        });
                    }
                    products.push(decomposition.product);
                }
                Err(DecomposeError::IncompleteData(product)) => {
                    caveats.push(AnalysisCaveat::IncompleteProductData { product_id: product.id() });
                    products.push(*product);
                }
                Err(DecomposeError::NotFound(product_id)) => {
                    return Err(AnalysisError::ProductNotFound(product_id));
                }
                Err(DecomposeError::Catalog(e)) => return Err(e.into()),
            }
        }

        let mut result =
            RoutineAnalyzer::new(graph, &self.policy).analyze(request, fingerprint.clone(), &products, caveats);
        self.explain(&mut result.findings).await;
        Ok(result)
    }

    /// Attaches supplementary explanations to the leading findings.
    async fn explain(&self, findings: &mut [ConflictFinding]) {
        if !self.explainer.is_enabled() || findings.is_empty() {
            return;
        }

        let limit = self.settings.explainer_max_findings.min(findings.len());
        let timeout = self.settings.explainer_timeout;
        let explanations = join_all(
            findings[..limit]
                .iter()
                .map(|finding| tokio::time::timeout(timeout, self.explainer.explain(finding))),
        )
        .await;

        for (finding, outcome) in findings.iter_mut().zip(explanations) {
            match outcome {
                Ok(Ok(text)) => finding.supplementary_explanation = Some(text),
                Ok(Err(e)) => {
                    tracing::warn!(finding = %finding.title, error = %e, "finding explanation failed");
                }
                Err(_) => {
                    tracing::warn!(finding = %finding.title, "finding explanation timed out");
                }
            }
        }
    }
}
