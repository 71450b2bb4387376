//! Process-wide query cache with stale marking.
//!
//! Entries are keyed by collection name. `mark_stale` never drops data; it only
//! flags the entry so the next `read` refetches. A key that has never been read
//! can still be marked stale, which records the invalidation for observers.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::future::Future;

use super::BaseCacheInvalidator;

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    data: Option<Value>,
    stale: bool,
    fetched_at: Option<DateTime<Utc>>,
    invalidations: u64,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.data.is_some() && !self.stale
    }
}

/// Invalidation registry shared by everything that reads cached collections.
#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<String, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, fetching it when missing or stale.
    ///
    /// A failed fetch leaves the entry as it was.
    pub async fn read<F, Fut>(&self, key: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh() {
                if let Some(data) = &entry.data {
                    return Ok(data.clone());
                }
            }
        }

        tracing::debug!(key, "Cache miss or stale entry, refetching");
        let data = fetch().await?;

        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.data = Some(data.clone());
        entry.stale = false;
        entry.fetched_at = Some(Utc::now());
        Ok(data)
    }

    /// Seed an entry without going through a fetch.
    pub fn put(&self, key: &str, data: Value) {
        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.data = Some(data);
        entry.stale = false;
        entry.fetched_at = Some(Utc::now());
    }

    /// Flag `key` stale. Its next read refetches.
    pub fn invalidate(&self, key: &str) {
        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.stale = true;
        entry.invalidations += 1;
    }

    /// True when the entry exists and has been marked stale since its last fetch.
    pub fn is_stale(&self, key: &str) -> bool {
        self.entries.get(key).map(|e| e.stale).unwrap_or(false)
    }

    /// Number of times `key` has been marked stale.
    pub fn invalidation_count(&self, key: &str) -> u64 {
        self.entries.get(key).map(|e| e.invalidations).unwrap_or(0)
    }

    /// When `key` was last fetched, if ever.
    pub fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).and_then(|e| e.fetched_at)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[async_trait]
impl BaseCacheInvalidator for QueryCache {
    async fn mark_stale(&self, key: &str) -> Result<()> {
        self.invalidate(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_read_caches_until_stale() {
        let cache = QueryCache::new();
        let counter = AtomicUsize::new(0);
        let fetches = &counter;

        let fetch = move || async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(json!(["j1"]))
        };

        assert_eq!(cache.read("myFrames", fetch).await.unwrap(), json!(["j1"]));
        assert_eq!(cache.read("myFrames", fetch).await.unwrap(), json!(["j1"]));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.mark_stale("myFrames").await.unwrap();
        assert!(cache.is_stale("myFrames"));

        cache.read("myFrames", fetch).await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert!(!cache.is_stale("myFrames"));
        assert!(cache.fetched_at("myFrames").is_some());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_entry_stale() {
        let cache = QueryCache::new();
        cache.put("myFrames", json!([]));
        cache.invalidate("myFrames");

        let result = cache
            .read("myFrames", || async { Err::<Value, _>(anyhow::anyhow!("offline")) })
            .await;

        assert!(result.is_err());
        assert!(cache.is_stale("myFrames"));
    }

    #[test]
    fn test_invalidation_counts_per_key() {
        let cache = QueryCache::new();
        cache.invalidate("myFrames");
        cache.invalidate("myFrames");
        cache.invalidate("other");

        assert_eq!(cache.invalidation_count("myFrames"), 2);
        assert_eq!(cache.invalidation_count("other"), 1);
        assert_eq!(cache.invalidation_count("unknown"), 0);
        assert!(!cache.is_stale("unknown"));
    }
}
