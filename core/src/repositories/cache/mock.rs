//! Mock implementation of TtlCache for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::CacheError;
use crate::services::clock::Clock;

use super::r#trait::TtlCache;

/// Mock TTL cache driven by an injected clock
pub struct MockTtlCache {
    entries: Arc<RwLock<HashMap<String, (String, i64)>>>,
    clock: Arc<dyn Clock>,
    supports_prefix_delete: bool,
    failing: AtomicBool,
}

impl MockTtlCache {
    /// Create a new mock cache without prefix deletion support
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            supports_prefix_delete: false,
            failing: AtomicBool::new(false),
        }
    }

    /// Create a mock cache that supports prefix deletion
    pub fn with_prefix_delete(clock: Arc<dyn Clock>) -> Self {
        Self {
            supports_prefix_delete: true,
            ..Self::new(clock)
        }
    }

    /// Make every subsequent operation fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw stored value and expiry for a key
    pub async fn entry(&self, key: &str) -> Option<(String, i64)> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Connection {
                message: "mock cache unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TtlCache for MockTtlCache {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        self.check()?;
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = self.clock.timestamp().saturating_add(ttl);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.check()?;
        let now = self.clock.timestamp();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .map(|(_, expires_at)| *expires_at > now)
            .unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.check()?;
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<Option<u64>, CacheError> {
        self.check()?;
        if !self.supports_prefix_delete {
            return Ok(None);
        }
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(Some((before - entries.len()) as u64))
    }
}
