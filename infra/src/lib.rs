//! # Infrastructure Layer
//!
//! Concrete TTL cache backends for the Tokenwarden revocation ledger.
//!
//! ## Backends
//!
//! - **Redis**: multiplexed async connection with retry and exponential backoff
//! - **Memory**: process-local map with lazy expiry, for development and tests
//!
//! Both implement [`tw_core::repositories::TtlCache`], so the token manager is
//! generic over whichever one the application selects at startup.

use std::sync::Arc;

use tw_core::repositories::TtlCache;
use tw_core::services::clock::SystemClock;
use tw_shared::config::{CacheBackend, CacheConfig};

// Re-export core error types for convenience
pub use tw_core::errors::CacheError;

/// Cache module - Redis client and in-memory cache
pub mod cache;

pub use cache::{MemoryCache, RedisClient};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Connection could not be established in time
    #[error("Connection timed out after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for CacheError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(e) if e.is_connection_refusal() || e.is_io_error() => {
                CacheError::Connection {
                    message: e.to_string(),
                }
            }
            InfrastructureError::Timeout(_) => CacheError::Connection {
                message: err.to_string(),
            },
            other => CacheError::Operation {
                message: other.to_string(),
            },
        }
    }
}

/// Shared handle to whichever cache backend is configured
pub type SharedCache = Arc<dyn TtlCache>;

/// Build the cache backend selected by `config.backend`
///
/// # Arguments
/// * `config` - Cache configuration
///
/// # Returns
/// * `Ok(SharedCache)` - Connected backend
/// * `Err(InfrastructureError)` - Redis URL invalid or server unreachable
pub async fn connect_cache(config: &CacheConfig) -> Result<SharedCache, InfrastructureError> {
    tracing::info!(backend = ?config.backend, "Initializing revocation cache");

    match config.backend {
        CacheBackend::Redis => {
            let client = RedisClient::new(config.clone()).await?;
            Ok(Arc::new(client))
        }
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::with_config(
            config,
            Arc::new(SystemClock),
        ))),
    }
}
