//! In-memory analysis cache for single-process deployments and tests.
//!
//! Expired entries are evicted lazily on read; `run` sweeps them on an
//! interval until shutdown.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time;

use crate::domain::analysis::{AnalysisResult, Fingerprint};
use crate::ports::{AnalysisCache, CacheError};

#[derive(Debug, Clone)]
struct Entry {
    result: AnalysisResult,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Fingerprint-keyed cache held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnalysisCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryAnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes every expired entry. Returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Sweeps every `interval` until the shutdown signal is received.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::debug!("analysis cache sweeper stopped");
                        return;
                    }
                }

                _ = ticker.tick() => {
                    let evicted = self.sweep().await;
                    if evicted > 0 {
                        tracing::debug!(evicted, "swept expired analysis cache entries");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(fingerprint.as_str()) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.result.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a fresh put may have replaced it.
        let mut entries = self.entries.write().await;
        if entries
            .get(fingerprint.as_str())
            .is_some_and(|entry| entry.is_expired(now))
        {
            entries.remove(fingerprint.as_str());
        }
        Ok(None)
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        result: &AnalysisResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = Entry {
            result: result.clone(),
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .await
            .insert(fingerprint.as_str().to_string(), entry);
        Ok(())
    }
}
