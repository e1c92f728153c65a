//! Token lifecycle orchestration: issue, parse, refresh, invalidate

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use tw_shared::config::JwtConfig;

use crate::domain::entities::claims::{AUDIENCE, ISSUER};
use crate::domain::entities::{is_registered, ClaimSet, Token};
use crate::errors::{InvalidReason, TokenError, TokenResult};
use crate::repositories::cache::TtlCache;
use crate::services::clock::{Clock, SystemClock};
use crate::services::request::{ParserChain, RequestReader};
use crate::services::revocation::RevocationStore;

use super::codec::TokenCodec;
use super::payload::ClaimsDefaults;
use super::signer::SignerConfig;
use super::validator::{ClaimValidator, ExpectedClaims, ValidationPolicy};

/// Revocation TTL used for `force_forever` (ten years)
pub const PERMANENT_REVOCATION_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Token lifecycle manager
///
/// Tokens move Issued -> Valid -> Expired | Revoked and never return to Valid.
/// The manager holds immutable configuration plus shared collaborators, so a
/// single instance can serve concurrent requests. Calls into the TTL cache are
/// the only suspension points.
pub struct TokenManager<C: TtlCache> {
    codec: TokenCodec,
    validator: ClaimValidator,
    defaults: ClaimsDefaults,
    revocation: RevocationStore<C>,
    revocation_enabled: bool,
    parser_chain: ParserChain,
    subject_claim: String,
    expected: ExpectedClaims,
    clock: Arc<dyn Clock>,
}

impl<C: TtlCache> TokenManager<C> {
    /// Creates a new token manager
    ///
    /// # Arguments
    ///
    /// * `config` - JWT lifecycle configuration
    /// * `cache` - TTL cache backing the revocation ledger
    /// * `clock` - Time source
    ///
    /// # Returns
    ///
    /// * `Ok(TokenManager)` - Configuration accepted and keys loaded
    /// * `Err(TokenError::Config)` - Invalid configuration or key material
    pub fn new(config: &JwtConfig, cache: C, clock: Arc<dyn Clock>) -> TokenResult<Self> {
        config
            .validate()
            .map_err(|e| TokenError::config(e.to_string()))?;

        let signer = SignerConfig::from_jwt_config(config)?;
        let codec = TokenCodec::new(&signer)?;
        let defaults = ClaimsDefaults::from_config(config)?;

        let required: Vec<String> = config
            .required_claims
            .iter()
            .filter(|(_, required)| **required)
            .map(|(name, _)| name.clone())
            .collect();

        let mut expected = ExpectedClaims::new();
        if required.iter().any(|name| name == ISSUER) {
            expected = expected.with_issuer(config.issuer.clone());
        }
        if required.iter().any(|name| name == AUDIENCE) {
            expected = expected.with_audience(config.audience.values());
        }

        let policy = ValidationPolicy::new(required, config.leeway_seconds);
        let validator = ClaimValidator::new(policy, clock.clone());

        let revocation = RevocationStore::new(
            cache,
            config.revocation_key_prefix.clone(),
            config.revocation_grace_period_seconds,
            clock.clone(),
        );

        info!(
            algorithm = ?codec.algorithm(),
            ttl_seconds = defaults.ttl_seconds(),
            revocation_enabled = config.revocation_enabled,
            "Token manager initialized"
        );

        Ok(Self {
            codec,
            validator,
            defaults,
            revocation,
            revocation_enabled: config.revocation_enabled,
            parser_chain: ParserChain::from_specs(&config.parser_chain),
            subject_claim: config.subject_claim.clone(),
            expected,
            clock,
        })
    }

    /// Creates a token manager using the system clock
    pub fn with_system_clock(config: &JwtConfig, cache: C) -> TokenResult<Self> {
        Self::new(config, cache, Arc::new(SystemClock))
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn validator(&self) -> &ClaimValidator {
        &self.validator
    }

    pub fn defaults(&self) -> &ClaimsDefaults {
        &self.defaults
    }

    pub fn revocation(&self) -> &RevocationStore<C> {
        &self.revocation
    }

    pub fn parser_chain(&self) -> &ParserChain {
        &self.parser_chain
    }

    pub fn is_revocation_enabled(&self) -> bool {
        self.revocation_enabled
    }

    /// Issue a new signed token
    ///
    /// The subject is taken from the configured subject claim in
    /// `custom_claims` when present, otherwise from `subject`, and is stored
    /// as `sub`.
    ///
    /// # Arguments
    ///
    /// * `custom_claims` - Application claims to embed
    /// * `subject` - Subject used when the custom claims carry none
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Signed token
    /// * `Err(TokenError::TokenInvalid)` - A custom claim overrides a registered claim
    /// * `Err(TokenError::Signing)` - Signing failed
    pub fn issue(&self, custom_claims: ClaimSet, subject: Option<&str>) -> TokenResult<Token> {
        let mut subject = subject.map(str::to_string);
        let mut builder = ClaimSet::builder();

        for (name, value) in custom_claims {
            if name == self.subject_claim {
                subject = Some(subject_value(&name, value)?);
                continue;
            }
            if is_registered(&name) {
                return Err(TokenError::invalid(
                    InvalidReason::RegisteredClaim,
                    format!("custom claims cannot set registered claim {}", name),
                ));
            }
            builder = builder.claim(name, value);
        }

        let now = self.clock.timestamp();
        builder = self.defaults.apply(builder, now);
        if let Some(subject) = subject {
            builder = builder.subject(subject);
        }

        let token = self.codec.encode(&builder.build())?;
        info!(
            jti = token.jti().unwrap_or_default(),
            sub = token.subject().unwrap_or_default(),
            "Token issued"
        );
        Ok(token)
    }

    /// Verify and validate a compact token string
    ///
    /// Checks run in order: signature and structure, time window (with
    /// leeway), revocation, then required and expected claims.
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - Token is valid
    /// * `Err(TokenError)` - The most specific failure
    pub async fn parse(&self, raw: &str) -> TokenResult<Token> {
        let token = self.codec.verify_signature(raw)?;
        let claims = token.claims();

        self.validator
            .check_timestamps(claims, self.validator.leeway())?;

        if self.revocation_enabled {
            if let Some(jti) = claims.jti() {
                if self.revocation.has(jti).await? {
                    debug!(jti = %jti, "Rejected revoked token");
                    return Err(TokenError::invalid(
                        InvalidReason::Revoked,
                        "token has been revoked",
                    ));
                }
            }
        }

        self.validator.validate(claims, false, &self.expected)?;

        debug!(jti = claims.jti().unwrap_or_default(), "Token validated");
        Ok(token)
    }

    /// Extract a token with the parser chain and validate it
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The request carries no credential
    /// * `Ok(Some(Token))` - Valid token
    /// * `Err(TokenError)` - A credential was found but is not valid
    pub async fn parse_from_request<R>(&self, request: &R) -> TokenResult<Option<Token>>
    where
        R: RequestReader + ?Sized,
    {
        match self.parser_chain.extract(request) {
            Some(raw) => self.parse(&raw).await.map(Some),
            None => {
                debug!("No token found in request");
                Ok(None)
            }
        }
    }

    /// Exchange a token for a new one and revoke the old token
    ///
    /// Only the signature of the old token is checked, so an expired token can
    /// be refreshed while `now <= exp + refresh_ttl`.
    ///
    /// # Arguments
    ///
    /// * `raw` - Compact token to refresh
    /// * `force_forever` - Revoke the old token permanently
    /// * `reset_claims` - Drop the old custom claims and subject
    ///
    /// # Returns
    ///
    /// * `Ok(Token)` - The new token
    /// * `Err(TokenError::Config)` - Revocation is disabled
    /// * `Err(TokenError::TokenInvalid)` - Old token already revoked, or has no `exp` or `jti`
    /// * `Err(TokenError::TokenExpired)` - Refresh window has closed
    pub async fn refresh(
        &self,
        raw: &str,
        force_forever: bool,
        reset_claims: bool,
    ) -> TokenResult<Token> {
        if !self.revocation_enabled {
            return Err(TokenError::config(
                "token refresh requires the revocation ledger to be enabled",
            ));
        }

        let old = self.codec.verify_signature(raw)?;
        let claims = old.claims();

        let jti = claims.jti().ok_or_else(|| {
            TokenError::invalid(
                InvalidReason::MissingIdentifier,
                "token has no jti and cannot be refreshed",
            )
        })?;

        if self.revocation.has(jti).await? {
            return Err(TokenError::invalid(
                InvalidReason::Revoked,
                "token has already been revoked",
            ));
        }

        let exp = claims
            .expires_at()
            .ok_or_else(|| TokenError::invalid_claims("token has no exp claim"))?;

        let now = self.clock.timestamp();
        let window_end = exp.saturating_add(self.defaults.refresh_ttl_seconds());
        if now > window_end {
            return Err(TokenError::expired(format!(
                "refresh window closed at {} (now {})",
                window_end, now
            )));
        }

        let ttl = if force_forever {
            PERMANENT_REVOCATION_SECONDS
        } else {
            window_end
                .saturating_sub(now)
                .clamp(1, PERMANENT_REVOCATION_SECONDS)
        };
        self.revocation.add(jti, ttl).await?;

        let (custom, subject) = if reset_claims {
            (ClaimSet::new(), None)
        } else {
            let custom: ClaimSet = claims
                .iter()
                .filter(|(name, _)| {
                    !is_registered(name)
                        && !self.defaults.is_refreshed(name)
                        && **name != self.subject_claim
                })
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            (custom, claims.subject())
        };

        let token = self.issue(custom, subject)?;
        info!(
            old_jti = %jti,
            new_jti = token.jti().unwrap_or_default(),
            "Token refreshed"
        );
        Ok(token)
    }

    /// Revoke a token for the grace period, or permanently with `force_forever`
    ///
    /// A no-op when revocation is disabled.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Token revoked (or revocation disabled)
    /// * `Err(TokenError::TokenInvalid)` - Token has no `jti`
    /// * `Err(TokenError::RevocationStore)` - Cache failure
    pub async fn invalidate(&self, token: &Token, force_forever: bool) -> TokenResult<()> {
        if !self.revocation_enabled {
            debug!("Revocation disabled, invalidate is a no-op");
            return Ok(());
        }

        let jti = token.jti().ok_or_else(|| {
            TokenError::invalid(
                InvalidReason::MissingIdentifier,
                "token has no jti and cannot be revoked",
            )
        })?;

        let ttl = if force_forever {
            PERMANENT_REVOCATION_SECONDS
        } else {
            self.revocation.grace_period()
        };

        self.revocation.add(jti, ttl).await?;
        info!(jti = %jti, force_forever, "Token invalidated");
        Ok(())
    }

    /// Verify the signature of a compact token and invalidate it
    ///
    /// Expired tokens can still be invalidated this way.
    pub async fn invalidate_raw(&self, raw: &str, force_forever: bool) -> TokenResult<()> {
        let token = self.codec.verify_signature(raw)?;
        self.invalidate(&token, force_forever).await
    }
}

fn subject_value(name: &str, value: Value) -> TokenResult<String> {
    match value {
        Value::String(subject) => Ok(subject),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(TokenError::invalid_claims(format!(
            "subject claim {} must be a string or number",
            name
        ))),
    }
}
