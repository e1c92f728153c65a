//! Token lifecycle configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Algorithms accepted in `JwtConfig::algorithm`
pub const SUPPORTED_ALGORITHMS: [&str; 9] = [
    "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "ES256", "ES384", "ES512",
];

/// Claims that are always regenerated when a token is refreshed
pub const ALWAYS_REFRESHED_CLAIMS: [&str; 4] = ["iat", "exp", "nbf", "jti"];

/// Errors reported by `JwtConfig::validate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Missing key material: {0}")]
    MissingKeyMaterial(String),

    #[error("Invalid lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Asymmetric key material. Each entry is either inline PEM text or a
/// `file://` path to a PEM file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeyMaterialConfig {
    /// Private key used for signing
    #[serde(default)]
    pub private: Option<String>,

    /// Public key used for verification
    #[serde(default)]
    pub public: Option<String>,

    /// Passphrase protecting an encrypted PKCS#8 private key
    #[serde(default)]
    pub passphrase: Option<String>,
}

/// Audience claim configuration, a single value or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AudienceConfig {
    One(String),
    Many(Vec<String>),
}

impl AudienceConfig {
    /// Flatten into the list of configured audiences
    pub fn values(&self) -> Vec<String> {
        match self {
            AudienceConfig::One(value) => vec![value.clone()],
            AudienceConfig::Many(values) => values.clone(),
        }
    }
}

/// One step of the request parser chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParserSpec {
    Header {
        #[serde(default = "default_header_name")]
        name: String,
        #[serde(default = "default_header_prefix")]
        prefix: String,
    },
    Query {
        #[serde(default = "default_field_name")]
        name: String,
    },
    Cookie {
        #[serde(default = "default_field_name")]
        name: String,
    },
    Body {
        #[serde(default = "default_field_name")]
        name: String,
    },
}

/// JWT lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Signing algorithm (HS256, RS384, ES256, ...)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Shared secret for HMAC algorithms
    #[serde(default)]
    pub secret: Option<String>,

    /// Key pair for RSA and ECDSA algorithms
    #[serde(default)]
    pub keys: KeyMaterialConfig,

    /// Token lifetime in minutes
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Refresh window in minutes, counted from the token expiry
    #[serde(default = "default_refresh_ttl_minutes")]
    pub refresh_ttl_minutes: i64,

    /// Offset applied to `nbf` relative to the issue time
    #[serde(default)]
    pub nbf_offset_seconds: i64,

    /// Issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Audience claim
    #[serde(default = "default_audience")]
    pub audience: AudienceConfig,

    /// Custom claim name carrying the subject on issuance
    #[serde(default = "default_subject_claim")]
    pub subject_claim: String,

    /// Claim name to whether it is required. Required `iss` and `aud` are
    /// also checked against the configured issuer and audience.
    #[serde(default = "default_required_claims")]
    pub required_claims: BTreeMap<String, bool>,

    /// Clock skew tolerance in seconds
    #[serde(default)]
    pub leeway_seconds: i64,

    /// Enable the revocation ledger
    #[serde(default = "default_revocation_enabled")]
    pub revocation_enabled: bool,

    /// Seconds an invalidated token stays revoked
    #[serde(default = "default_grace_period")]
    pub revocation_grace_period_seconds: i64,

    /// Cache key prefix for revocation entries
    #[serde(default = "default_revocation_prefix")]
    pub revocation_key_prefix: String,

    /// Extra claims regenerated on refresh
    #[serde(default)]
    pub claims_to_refresh: Vec<String>,

    /// Ordered token extraction strategies
    #[serde(default)]
    pub parser_chain: Vec<ParserSpec>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            secret: None,
            keys: KeyMaterialConfig::default(),
            ttl_minutes: default_ttl_minutes(),
            refresh_ttl_minutes: default_refresh_ttl_minutes(),
            nbf_offset_seconds: 0,
            issuer: default_issuer(),
            audience: default_audience(),
            subject_claim: default_subject_claim(),
            required_claims: default_required_claims(),
            leeway_seconds: 0,
            revocation_enabled: default_revocation_enabled(),
            revocation_grace_period_seconds: default_grace_period(),
            revocation_key_prefix: default_revocation_prefix(),
            claims_to_refresh: Vec::new(),
            parser_chain: Vec::new(),
        }
    }
}

impl JwtConfig {
    /// Create an HMAC configuration with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    /// Create an asymmetric configuration with a key pair
    pub fn with_keys(
        algorithm: impl Into<String>,
        private: impl Into<String>,
        public: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            keys: KeyMaterialConfig {
                private: Some(private.into()),
                public: Some(public.into()),
                passphrase: None,
            },
            ..Default::default()
        }
    }

    /// Set the passphrase of an encrypted private key
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.keys.passphrase = Some(passphrase.into());
        self
    }

    /// Set token lifetime in minutes
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Set the refresh window in minutes
    pub fn with_refresh_ttl_minutes(mut self, minutes: i64) -> Self {
        self.refresh_ttl_minutes = minutes;
        self
    }

    pub fn with_leeway(mut self, seconds: i64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_audience(mut self, audience: AudienceConfig) -> Self {
        self.audience = audience;
        self
    }

    pub fn with_parser_chain(mut self, chain: Vec<ParserSpec>) -> Self {
        self.parser_chain = chain;
        self
    }

    /// Enable or disable the revocation ledger
    pub fn with_revocation(mut self, enabled: bool) -> Self {
        self.revocation_enabled = enabled;
        self
    }

    /// Set the grace period applied by `invalidate`
    pub fn with_grace_period(mut self, seconds: i64) -> Self {
        self.revocation_grace_period_seconds = seconds;
        self
    }

    /// Whether the configured algorithm uses a shared secret
    pub fn is_symmetric(&self) -> bool {
        self.algorithm.to_ascii_uppercase().starts_with("HS")
    }

    /// Claims regenerated on refresh, always including `iat`, `exp`, `nbf` and `jti`
    pub fn refreshed_claims(&self) -> Vec<String> {
        let mut claims: Vec<String> = ALWAYS_REFRESHED_CLAIMS
            .iter()
            .map(|claim| claim.to_string())
            .collect();
        for claim in &self.claims_to_refresh {
            if !claims.contains(claim) {
                claims.push(claim.clone());
            }
        }
        claims
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let algorithm = std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm);
        let audience = std::env::var("JWT_AUDIENCE")
            .ok()
            .map(|value| {
                let parts: Vec<String> = value
                    .split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect();
                if parts.len() == 1 {
                    AudienceConfig::One(parts[0].clone())
                } else {
                    AudienceConfig::Many(parts)
                }
            })
            .unwrap_or(defaults.audience);

        Self {
            algorithm,
            secret: std::env::var("JWT_SECRET").ok(),
            keys: KeyMaterialConfig {
                private: std::env::var("JWT_PRIVATE_KEY").ok(),
                public: std::env::var("JWT_PUBLIC_KEY").ok(),
                passphrase: std::env::var("JWT_PASSPHRASE").ok(),
            },
            ttl_minutes: env_number("JWT_TTL", defaults.ttl_minutes),
            refresh_ttl_minutes: env_number("JWT_REFRESH_TTL", defaults.refresh_ttl_minutes),
            nbf_offset_seconds: env_number("JWT_NBF_OFFSET", defaults.nbf_offset_seconds),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience,
            leeway_seconds: env_number("JWT_LEEWAY", defaults.leeway_seconds),
            revocation_enabled: std::env::var("JWT_BLACKLIST_ENABLED")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.revocation_enabled),
            revocation_grace_period_seconds: env_number(
                "JWT_BLACKLIST_GRACE_PERIOD",
                defaults.revocation_grace_period_seconds,
            ),
            ..defaults
        }
    }

    /// Check the configuration for values the token engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let algorithm = self.algorithm.to_ascii_uppercase();
        if !SUPPORTED_ALGORITHMS.contains(&algorithm.as_str()) {
            return Err(ConfigValidationError::UnsupportedAlgorithm(self.algorithm.clone()));
        }

        if self.is_symmetric() {
            if self.secret.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigValidationError::MissingKeyMaterial(format!(
                    "{} requires a non-empty secret",
                    algorithm
                )));
            }
        } else if self.keys.private.is_none() || self.keys.public.is_none() {
            return Err(ConfigValidationError::MissingKeyMaterial(format!(
                "{} requires both a private and a public key",
                algorithm
            )));
        }

        if self.ttl_minutes < 1 {
            return Err(ConfigValidationError::InvalidLifetime(
                "ttl_minutes must be at least 1".to_string(),
            ));
        }
        if self.refresh_ttl_minutes <= self.ttl_minutes {
            return Err(ConfigValidationError::InvalidLifetime(format!(
                "refresh_ttl_minutes ({}) must exceed ttl_minutes ({})",
                self.refresh_ttl_minutes, self.ttl_minutes
            )));
        }
        if self.nbf_offset_seconds >= self.ttl_minutes.saturating_mul(60) {
            return Err(ConfigValidationError::InvalidLifetime(
                "nbf_offset_seconds must be shorter than the token lifetime".to_string(),
            ));
        }
        if self.leeway_seconds < 0 {
            return Err(ConfigValidationError::InvalidValue {
                field: "leeway_seconds".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.subject_claim.is_empty() {
            return Err(ConfigValidationError::InvalidValue {
                field: "subject_claim".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn env_number(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_ttl_minutes() -> i64 {
    60
}

fn default_refresh_ttl_minutes() -> i64 {
    20160 // 2 weeks
}

fn default_issuer() -> String {
    String::from("tokenwarden")
}

fn default_audience() -> AudienceConfig {
    AudienceConfig::One(String::from("tokenwarden"))
}

fn default_subject_claim() -> String {
    String::from("sub")
}

fn default_required_claims() -> BTreeMap<String, bool> {
    ["iss", "aud", "iat", "nbf", "exp"]
        .iter()
        .map(|claim| (claim.to_string(), true))
        .collect()
}

fn default_revocation_enabled() -> bool {
    true
}

fn default_grace_period() -> i64 {
    3600
}

fn default_revocation_prefix() -> String {
    String::from("jwt_blacklist:")
}

fn default_header_name() -> String {
    String::from("Authorization")
}

fn default_header_prefix() -> String {
    String::from("Bearer")
}

fn default_field_name() -> String {
    String::from("token")
}
