//! In-memory score cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use tokio::sync::RwLock;

use super::{Clock, ScoreCacheEntry, ScoreStore, SectionScore, SystemClock};
use crate::config::{METHODOLOGY_VERSION, SCORE_CACHE_TTL};
use crate::fingerprint::WebsiteSignature;

/// Snapshot of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Expired entries removed during lookups and writes.
    pub evictions: u64,
    /// Entries currently stored.
    pub entries: usize,
}

/// Score cache held in process memory, safe for concurrent use.
pub struct InMemoryScoreCache {
    entries: RwLock<HashMap<String, ScoreCacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    methodology_version: String,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemoryScoreCache {
    /// Creates a cache with the standard TTL and methodology version.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), SCORE_CACHE_TTL, METHODOLOGY_VERSION)
    }

    /// Creates a cache with an explicit clock, TTL and methodology version.
    pub fn with_clock(clock: Arc<dyn Clock>, ttl: Duration, methodology_version: &str) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl,
            methodology_version: methodology_version.to_string(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Current counter values.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            evictions: self.evictions.load(Ordering::SeqCst),
            entries: self.entries.read().await.len(),
        }
    }

    fn miss(&self) -> Option<ScoreCacheEntry> {
        self.misses.fetch_add(1, Ordering::SeqCst);
        None
    }

    /// Removes `key` if its entry is still expired.
    async fn evict(&self, key: &str) {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::SeqCst);
            debug!("Evicted expired score cache entry {key}");
        }
    }
}

impl Default for InMemoryScoreCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreCache {
    async fn get(&self, signature: &WebsiteSignature) -> Option<ScoreCacheEntry> {
        let key = signature.cache_key();
        let now = self.clock.now();

        let entry = self.entries.read().await.get(&key).cloned();
        let Some(entry) = entry else {
            debug!("Score cache miss for {key}");
            return self.miss();
        };
        if entry.expires_at <= now {
            self.evict(&key).await;
            return self.miss();
        }
        if !entry.signature.matches(signature) || entry.methodology_version != self.methodology_version {
            debug!(
                "Score cache entry {} does not match (methodology {} vs {})",
                key, entry.methodology_version, self.methodology_version
            );
            return self.miss();
        }

        self.hits.fetch_add(1, Ordering::SeqCst);
        debug!("Score cache hit for {key}");
        Some(entry)
    }

    async fn put(
        &self,
        signature: WebsiteSignature,
        overall_score: u8,
        section_scores: Vec<SectionScore>,
        methodology_version: &str,
    ) -> ScoreCacheEntry {
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        let entry = ScoreCacheEntry {
            signature,
            section_scores,
            overall_score,
            methodology_version: methodology_version.to_string(),
            expires_at,
        };

        let mut entries = self.entries.write().await;
        // Entries that are never looked up again would otherwise stay forever
        let before = entries.len();
        entries.retain(|_, stored| stored.expires_at > now);
        let swept = before - entries.len();
        if swept > 0 {
            self.evictions.fetch_add(swept as u64, Ordering::SeqCst);
            debug!("Swept {swept} expired score cache entries");
        }
        entries.insert(entry.signature.cache_key(), entry.clone());
        entry
    }
}
