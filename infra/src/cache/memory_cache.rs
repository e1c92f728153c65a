//! In-memory TTL cache
//!
//! Process-local alternative to Redis for development, single-instance
//! deployments and tests. Entries expire lazily: reads ignore expired
//! entries and [`MemoryCache::purge_expired`] drops them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use tw_core::errors::CacheError;
use tw_core::repositories::TtlCache;
use tw_core::services::clock::{Clock, SystemClock};
use tw_shared::config::CacheConfig;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: i64,
}

/// TTL cache backed by a `HashMap` behind an async `RwLock`
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
    key_prefix: Option<String>,
}

impl MemoryCache {
    /// Create an empty cache using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache driven by `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            key_prefix: None,
        }
    }

    /// Create an empty cache that namespaces keys like the Redis backend
    pub fn with_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            key_prefix: config.key_prefix.clone(),
            ..Self::with_clock(clock)
        }
    }

    /// Value stored under `key`, if present and unexpired
    pub async fn get(&self, key: &str) -> Option<String> {
        let key = self.make_key(key);
        let now = self.clock.timestamp();
        self.entries
            .read()
            .await
            .get(&key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop expired entries
    ///
    /// # Returns
    /// * Number of entries removed
    pub async fn purge_expired(&self) -> u64 {
        let now = self.clock.timestamp();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = (before - entries.len()) as u64;
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let ttl = i64::try_from(ttl_seconds.max(1)).map_err(|_| CacheError::Operation {
            message: format!("ttl of {}s is out of range", ttl_seconds),
        })?;
        let expires_at = self.clock.timestamp().saturating_add(ttl);

        self.entries.write().await.insert(
            self.make_key(key),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.make_key(key);
        let now = self.clock.timestamp();
        Ok(self
            .entries
            .write()
            .await
            .remove(&key)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<Option<u64>, CacheError> {
        let prefix = self.make_key(prefix);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        let removed = (before - entries.len()) as u64;
        debug!(prefix = %prefix, removed, "Deleted cache entries by prefix");
        Ok(Some(removed))
    }
}
