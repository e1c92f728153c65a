//! TTL-keyed set of revoked token identifiers

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::errors::{TokenError, TokenResult};
use crate::repositories::cache::TtlCache;
use crate::services::clock::Clock;

/// Default namespace for revocation entries
pub const DEFAULT_KEY_PREFIX: &str = "jwt_blacklist:";

/// Revocation ledger backed by a [`TtlCache`]
pub struct RevocationStore<C: TtlCache> {
    cache: C,
    prefix: String,
    grace_period: i64,
    clock: Arc<dyn Clock>,
}

impl<C: TtlCache> RevocationStore<C> {
    /// Create a store. A negative grace period is clamped to zero.
    pub fn new(cache: C, prefix: impl Into<String>, grace_period: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            grace_period: grace_period.max(0),
            clock,
        }
    }

    /// Seconds an invalidated token stays revoked
    pub fn grace_period(&self) -> i64 {
        self.grace_period
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Cache key for a token identifier
    pub fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Revoke `id` for `ttl_seconds`
    ///
    /// A non-positive TTL removes any existing entry instead of storing one.
    /// The stored value is the unix time at which the entry lapses.
    ///
    /// # Returns
    /// * `Ok(())` - Entry stored (or removed)
    /// * `Err(TokenError::RevocationStore)` - Cache failure
    pub async fn add(&self, id: &str, ttl_seconds: i64) -> TokenResult<()> {
        let key = self.key(id);

        if ttl_seconds <= 0 {
            debug!(jti = %id, "Non-positive revocation TTL, removing entry");
            self.cache.delete(&key).await.map_err(|e| {
                error!(jti = %id, error = %e, "Failed to delete revocation entry");
                TokenError::from(e)
            })?;
            return Ok(());
        }

        let expires_at = self.clock.timestamp().saturating_add(ttl_seconds);
        self.cache
            .set(&key, &expires_at.to_string(), ttl_seconds as u64)
            .await
            .map_err(|e| {
                error!(jti = %id, error = %e, "Failed to store revocation entry");
                TokenError::from(e)
            })?;

        info!(jti = %id, ttl_seconds, "Token identifier revoked");
        Ok(())
    }

    /// Whether `id` is currently revoked
    pub async fn has(&self, id: &str) -> TokenResult<bool> {
        self.cache.has(&self.key(id)).await.map_err(|e| {
            error!(jti = %id, error = %e, "Failed to query revocation entry");
            TokenError::from(e)
        })
    }

    /// Remove `id` from the ledger; absence is not an error
    pub async fn remove(&self, id: &str) -> TokenResult<()> {
        let removed = self.cache.delete(&self.key(id)).await?;
        debug!(jti = %id, removed, "Revocation entry removed");
        Ok(())
    }

    /// Drop every revocation entry
    ///
    /// Only works when the cache supports prefix deletion natively. Otherwise
    /// nothing is deleted and `Ok(false)` is returned.
    pub async fn clear(&self) -> TokenResult<bool> {
        match self.cache.delete_prefix(&self.prefix).await? {
            Some(count) => {
                info!(prefix = %self.prefix, count, "Revocation ledger cleared");
                Ok(true)
            }
            None => {
                warn!(
                    prefix = %self.prefix,
                    "Cache backend cannot delete by prefix, revocation ledger not cleared"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::cache::MockTtlCache;
    use crate::services::clock::FixedClock;

    fn store(clock: Arc<FixedClock>, cache: MockTtlCache) -> RevocationStore<MockTtlCache> {
        RevocationStore::new(cache, DEFAULT_KEY_PREFIX, 60, clock)
    }

    #[tokio::test]
    async fn test_add_and_expire() {
        let clock = Arc::new(FixedClock::at(1_000));
        let store = store(clock.clone(), MockTtlCache::new(clock.clone()));

        store.add("abc", 30).await.unwrap();
        assert!(store.has("abc").await.unwrap());
        assert_eq!(
            store.cache().entry("jwt_blacklist:abc").await,
            Some(("1030".to_string(), 1_030))
        );

        clock.advance(29);
        assert!(store.has("abc").await.unwrap());
        clock.advance(1);
        assert!(!store.has("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_positive_ttl_removes_entry() {
        let clock = Arc::new(FixedClock::at(0));
        let store = store(clock.clone(), MockTtlCache::new(clock));

        store.add("abc", 100).await.unwrap();
        store.add("abc", 0).await.unwrap();
        assert!(!store.has("abc").await.unwrap());

        store.add("other", -5).await.unwrap();
        assert!(!store.has("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let clock = Arc::new(FixedClock::at(0));
        let store = store(clock.clone(), MockTtlCache::new(clock));

        store.remove("missing").await.unwrap();
        store.add("abc", 100).await.unwrap();
        store.remove("abc").await.unwrap();
        assert!(!store.has("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_without_prefix_support_reports_failure() {
        let clock = Arc::new(FixedClock::at(0));
        let store = store(clock.clone(), MockTtlCache::new(clock));

        store.add("abc", 100).await.unwrap();
        assert!(!store.clear().await.unwrap());
        assert!(store.has("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_with_prefix_support() {
        let clock = Arc::new(FixedClock::at(0));
        let cache = MockTtlCache::with_prefix_delete(clock.clone());
        let store = store(clock, cache);

        store.add("a", 100).await.unwrap();
        store.add("b", 100).await.unwrap();
        store.cache().set("unrelated", "1", 100).await.unwrap();

        assert!(store.clear().await.unwrap());
        assert!(!store.has("a").await.unwrap());
        assert_eq!(store.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_failure_surfaces_as_store_error() {
        let clock = Arc::new(FixedClock::at(0));
        let store = store(clock.clone(), MockTtlCache::new(clock));
        store.cache().set_failing(true);

        assert!(matches!(
            store.add("abc", 10).await,
            Err(TokenError::RevocationStore { .. })
        ));
        assert!(matches!(
            store.has("abc").await,
            Err(TokenError::RevocationStore { .. })
        ));
    }

    #[test]
    fn test_negative_grace_period_clamped() {
        let clock = Arc::new(FixedClock::at(0));
        let store = RevocationStore::new(MockTtlCache::new(clock.clone()), "p:", -10, clock);
        assert_eq!(store.grace_period(), 0);
        assert_eq!(store.key("x"), "p:x");
    }
}
