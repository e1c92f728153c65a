//! Default registered claims applied on issuance

use tw_shared::config::{JwtConfig, ALWAYS_REFRESHED_CLAIMS};
use uuid::Uuid;

use crate::domain::entities::ClaimSetBuilder;
use crate::errors::{TokenError, TokenResult};

/// Issuer, audience, lifetimes and identifier generation for new tokens
#[derive(Debug, Clone)]
pub struct ClaimsDefaults {
    issuer: String,
    audience: Vec<String>,
    ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    nbf_offset_seconds: i64,
    refreshed_claims: Vec<String>,
}

impl ClaimsDefaults {
    /// Build defaults from configuration. The ttl is at least one minute and
    /// the nbf offset must leave `exp` strictly after `nbf`.
    pub fn from_config(config: &JwtConfig) -> TokenResult<Self> {
        let ttl_seconds = config.ttl_minutes.max(1).saturating_mul(60);
        if config.nbf_offset_seconds >= ttl_seconds {
            return Err(TokenError::config(format!(
                "nbf offset of {}s does not fit in a {}s token lifetime",
                config.nbf_offset_seconds, ttl_seconds
            )));
        }

        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.values(),
            ttl_seconds,
            refresh_ttl_seconds: config.refresh_ttl_minutes.max(0).saturating_mul(60),
            nbf_offset_seconds: config.nbf_offset_seconds,
            refreshed_claims: config.refreshed_claims(),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Length of the refresh window that opens at `exp`
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    pub fn nbf_offset_seconds(&self) -> i64 {
        self.nbf_offset_seconds
    }

    /// Claims regenerated by a refresh, never copied from the old token
    pub fn refreshed_claims(&self) -> &[String] {
        &self.refreshed_claims
    }

    pub fn is_refreshed(&self, name: &str) -> bool {
        ALWAYS_REFRESHED_CLAIMS.contains(&name) || self.refreshed_claims.iter().any(|c| c == name)
    }

    /// Fresh token identifier
    pub fn generate_jti(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Apply `iss`, `aud`, `iat`, `nbf`, `exp` and a new `jti` for a token issued at `now`
    pub fn apply(&self, builder: ClaimSetBuilder, now: i64) -> ClaimSetBuilder {
        builder
            .issuer(self.issuer.clone())
            .audience(self.audience.clone())
            .issued_at(now)
            .not_before(now.saturating_add(self.nbf_offset_seconds))
            .expires_at(now.saturating_add(self.ttl_seconds))
            .jti(self.generate_jti())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClaimSet;

    #[test]
    fn test_apply_sets_registered_claims() {
        let mut config = JwtConfig::new("secret").with_ttl_minutes(15);
        config.nbf_offset_seconds = 5;
        let defaults = ClaimsDefaults::from_config(&config).unwrap();

        let claims = defaults.apply(ClaimSet::builder(), 1_000).build();
        assert_eq!(claims.issuer(), Some("tokenwarden"));
        assert_eq!(claims.audience(), vec!["tokenwarden"]);
        assert_eq!(claims.issued_at(), Some(1_000));
        assert_eq!(claims.not_before(), Some(1_005));
        assert_eq!(claims.expires_at(), Some(1_900));
        assert_eq!(claims.jti().map(str::len), Some(32));
    }

    #[test]
    fn test_ttl_has_one_minute_floor() {
        let config = JwtConfig::new("secret").with_ttl_minutes(0);
        let defaults = ClaimsDefaults::from_config(&config).unwrap();
        assert_eq!(defaults.ttl_seconds(), 60);
    }

    #[test]
    fn test_huge_ttl_saturates_expiry() {
        let config = JwtConfig::new("secret").with_ttl_minutes(i64::MAX / 2);
        let defaults = ClaimsDefaults::from_config(&config).unwrap();
        assert_eq!(defaults.ttl_seconds(), i64::MAX);

        let claims = defaults.apply(ClaimSet::builder(), 1_000).build();
        assert_eq!(claims.expires_at(), Some(i64::MAX));
    }

    #[test]
    fn test_nbf_offset_must_fit_lifetime() {
        let mut config = JwtConfig::new("secret").with_ttl_minutes(1);
        config.nbf_offset_seconds = 60;
        assert!(matches!(
            ClaimsDefaults::from_config(&config),
            Err(TokenError::Config { .. })
        ));
    }

    #[test]
    fn test_jti_is_unique() {
        let defaults = ClaimsDefaults::from_config(&JwtConfig::new("secret")).unwrap();
        assert_ne!(defaults.generate_jti(), defaults.generate_jti());
    }

    #[test]
    fn test_refreshed_claims_include_configured_names() {
        let mut config = JwtConfig::new("secret");
        config.claims_to_refresh = vec!["session_started".to_string()];
        let defaults = ClaimsDefaults::from_config(&config).unwrap();

        assert!(defaults.is_refreshed("iat"));
        assert!(defaults.is_refreshed("session_started"));
        assert!(!defaults.is_refreshed("role"));
    }
}
