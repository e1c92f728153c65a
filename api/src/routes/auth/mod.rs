//! Token lifecycle route handlers
//!
//! - Token refresh
//! - Logout (token invalidation)
//! - Session introspection

pub mod logout;
pub mod refresh;
pub mod session;

use std::sync::Arc;

use tw_core::services::TokenManager;
use tw_infra::SharedCache;

/// Token manager shared by every worker
pub type SharedTokenManager = Arc<TokenManager<SharedCache>>;

/// Application state shared across handlers
pub struct AppState {
    pub tokens: SharedTokenManager,
}

impl AppState {
    pub fn new(tokens: TokenManager<SharedCache>) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }
}
