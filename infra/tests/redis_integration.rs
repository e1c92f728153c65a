//! Integration tests for the revocation ledger on real cache backends
//!
//! The Redis tests require a running Redis instance.
//! Run with: cargo test -p tw_infra --test redis_integration -- --ignored

use std::sync::Arc;

use tw_core::domain::ClaimSet;
use tw_core::services::clock::FixedClock;
use tw_core::services::TokenManager;
use tw_infra::cache::{CacheConfig, MemoryCache, RedisClient};
use tw_infra::connect_cache;
use tw_shared::config::JwtConfig;

fn jwt_config() -> JwtConfig {
    JwtConfig::new("integration-secret").with_grace_period(30)
}

fn redis_config() -> CacheConfig {
    CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix("tw-integration")
}

#[tokio::test]
async fn test_memory_backend_revokes_tokens() {
    let clock = Arc::new(FixedClock::at(1_700_000_000));
    let cache = MemoryCache::with_clock(clock.clone());
    let manager = TokenManager::new(&jwt_config(), cache.clone(), clock.clone()).unwrap();

    let token = manager.issue(ClaimSet::new(), Some("42")).unwrap();
    manager.invalidate(&token, false).await.unwrap();
    assert!(manager.parse(token.as_str()).await.is_err());

    clock.advance(30);
    assert!(manager.parse(token.as_str()).await.is_ok());
    assert_eq!(cache.purge_expired().await, 1);
}

#[tokio::test]
async fn test_memory_backend_clears_ledger() {
    let clock = Arc::new(FixedClock::at(1_700_000_000));
    let manager = TokenManager::new(&jwt_config(), MemoryCache::with_clock(clock.clone()), clock)
        .unwrap();

    let token = manager.issue(ClaimSet::new(), Some("42")).unwrap();
    manager.invalidate(&token, true).await.unwrap();

    assert!(manager.revocation().clear().await.unwrap());
    assert!(manager.parse(token.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_connect_memory_backend() {
    let cache = connect_cache(&CacheConfig::memory()).await.unwrap();
    let manager = TokenManager::with_system_clock(&jwt_config(), cache).unwrap();

    let token = manager.issue(ClaimSet::new(), Some("42")).unwrap();
    let refreshed = manager.refresh(token.as_str(), false, false).await.unwrap();

    assert!(manager.parse(refreshed.as_str()).await.is_ok());
    assert!(manager.parse(token.as_str()).await.is_err());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_connection() {
    let client = RedisClient::new(redis_config()).await;
    assert!(client.is_ok(), "Failed to connect to Redis");
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_backend_revokes_tokens() {
    let client = RedisClient::new(redis_config()).await.unwrap();
    let manager = TokenManager::with_system_clock(&jwt_config(), client).unwrap();

    let token = manager.issue(ClaimSet::new(), Some("42")).unwrap();
    assert!(manager.parse(token.as_str()).await.is_ok());

    manager.invalidate(&token, false).await.unwrap();
    assert!(manager.parse(token.as_str()).await.is_err());

    // Redis has no native prefix delete, so clearing reports false
    assert!(!manager.revocation().clear().await.unwrap());

    let jti = token.jti().unwrap();
    manager.revocation().remove(jti).await.unwrap();
    assert!(manager.parse(token.as_str()).await.is_ok());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_entry_expires() {
    let client = RedisClient::new(redis_config()).await.unwrap();
    let config = JwtConfig::new("integration-secret").with_grace_period(1);
    let manager = TokenManager::with_system_clock(&config, client).unwrap();

    let token = manager.issue(ClaimSet::new(), Some("42")).unwrap();
    manager.invalidate(&token, false).await.unwrap();
    assert!(manager.parse(token.as_str()).await.is_err());

    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
    assert!(manager.parse(token.as_str()).await.is_ok());
}
