use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tw_core::domain::Token;

/// Query options accepted by the refresh endpoint
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RefreshOptions {
    /// Revoke the old token permanently instead of until its refresh window closes
    #[serde(default)]
    pub force_forever: bool,
    /// Issue the new token without the old custom claims and subject
    #[serde(default)]
    pub reset_claims: bool,
}

/// Query options accepted by the logout endpoint
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogoutOptions {
    #[serde(default)]
    pub force_forever: bool,
}

/// Newly issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry
    pub expires_in: i64,
    pub expires_at: Option<i64>,
}

impl TokenResponse {
    pub fn new(token: &Token, now: i64) -> Self {
        let expires_at = token.claims().expires_at();
        Self {
            access_token: token.as_str().to_string(),
            token_type: "Bearer".to_string(),
            expires_in: expires_at.map(|exp| (exp - now).max(0)).unwrap_or_default(),
            expires_at,
        }
    }
}

/// Response for logout endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Claims of the authenticated token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub subject: Option<String>,
    pub jti: Option<String>,
    pub expires_at: Option<i64>,
    pub claims: Map<String, Value>,
}
