//! Cache backends for the revocation ledger
//!
//! This module provides the Redis client used in production and an in-memory
//! cache for development and tests. Both implement `TtlCache`.

pub mod memory_cache;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use memory_cache::MemoryCache;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use tw_shared::config::cache::CacheConfig;
