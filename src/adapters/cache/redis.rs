//! Redis-backed analysis cache for multi-instance deployments.
//!
//! Results are stored as JSON under `routine_analysis:{fingerprint}` with
//! `SET .. EX`, so Redis owns expiry.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::analysis::{AnalysisResult, Fingerprint};
use crate::ports::{AnalysisCache, CacheError};

const KEY_PREFIX: &str = "routine_analysis";

/// Redis implementation of AnalysisCache.
#[derive(Clone)]
pub struct RedisAnalysisCache {
    conn: MultiplexedConnection,
}

impl RedisAnalysisCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(redis_url).map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

fn cache_key(fingerprint: &Fingerprint) -> String {
    format!("{}:{}", KEY_PREFIX, fingerprint.as_str())
}

/// Redis rejects `EX 0`; sub-second TTLs round up to one second.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl AnalysisCache for RedisAnalysisCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(cache_key(fingerprint))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        payload
            .map(|json| serde_json::from_str(&json).map_err(|e| CacheError::Serialization(e.to_string())))
            .transpose()
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(result).map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(cache_key(fingerprint), payload, expiry_secs(ttl))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisAnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisAnalysisCache")
            .field("key_prefix", &KEY_PREFIX)
            .finish_non_exhaustive()
    }
}
