//! Analysis cache port - Memoizes results by request fingerprint.
//!
//! Expired entries behave as absent. Failures are reported to the caller,
//! which degrades to recomputation; a cache error never fails a request.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::analysis::{AnalysisResult, Fingerprint};

/// Port for storing computed analyses.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Cached result for `fingerprint`, `None` if absent or expired.
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError>;

    /// Stores `result` under `fingerprint` for `ttl`.
    async fn put(
        &self,
        fingerprint: &Fingerprint,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Cache backend is unavailable.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be encoded or decoded.
    #[error("cache serialization failed: {0}")]
    Serialization(String),
}
