//! Shared fixtures for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use serde_json::Value;
use tw_api::routes::auth::AppState;
use tw_core::domain::{ClaimSet, Token};
use tw_core::services::clock::FixedClock;
use tw_core::services::TokenManager;
use tw_infra::{MemoryCache, SharedCache};
use tw_shared::config::JwtConfig;

pub const NOW: i64 = 1_700_000_000;
pub const TTL: i64 = 3600;
pub const GRACE: i64 = 300;

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub clock: Arc<FixedClock>,
}

impl TestContext {
    pub fn new(config: JwtConfig) -> Self {
        let clock = Arc::new(FixedClock::at(NOW));
        let cache: SharedCache = Arc::new(MemoryCache::with_clock(clock.clone()));
        let tokens = TokenManager::new(&config, cache, clock.clone()).unwrap();

        Self {
            state: web::Data::new(AppState::new(tokens)),
            clock,
        }
    }

    pub fn issue(&self, subject: &str, custom: Value) -> Token {
        let claims: ClaimSet = serde_json::from_value(custom).unwrap();
        self.state.tokens.issue(claims, Some(subject)).unwrap()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(jwt_config())
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new("api-test-secret")
        .with_ttl_minutes(TTL / 60)
        .with_grace_period(GRACE)
}

pub fn bearer(token: &Token) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
