//! TTL cache trait backing the revocation ledger.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::CacheError;

/// Key/value cache with per-entry expiry
///
/// The token engine only needs a handful of operations: store with a TTL,
/// existence check and deletion. Prefix deletion is optional; backends that
/// cannot do it natively keep the default, which reports it as unsupported
/// instead of scanning the keyspace.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl_seconds`
    ///
    /// # Arguments
    /// * `key` - Full cache key
    /// * `value` - Value to store
    /// * `ttl_seconds` - Lifetime of the entry, at least 1
    ///
    /// # Returns
    /// * `Ok(())` - Entry stored
    /// * `Err(CacheError)` - Backend failure
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Check whether an unexpired entry exists for `key`
    async fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete the entry for `key`
    ///
    /// # Returns
    /// * `Ok(true)` - Entry existed and was deleted
    /// * `Ok(false)` - No entry for `key`
    /// * `Err(CacheError)` - Backend failure
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete every entry whose key starts with `prefix`
    ///
    /// # Returns
    /// * `Ok(Some(count))` - Number of entries deleted
    /// * `Ok(None)` - Backend has no native prefix deletion
    /// * `Err(CacheError)` - Backend failure
    async fn delete_prefix(&self, _prefix: &str) -> Result<Option<u64>, CacheError> {
        Ok(None)
    }
}

#[async_trait]
impl<T: TtlCache + ?Sized> TtlCache for Arc<T> {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        (**self).has(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        (**self).delete(key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<Option<u64>, CacheError> {
        (**self).delete_prefix(prefix).await
    }
}
