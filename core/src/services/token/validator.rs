//! Time-window and claim checks

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::entities::claims::{AUDIENCE, EXPIRES_AT, ISSUED_AT, ISSUER, NOT_BEFORE};
use crate::domain::entities::ClaimSet;
use crate::errors::{TokenError, TokenResult};
use crate::services::clock::Clock;

/// Required claim names and clock-skew tolerance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    required_claims: Vec<String>,
    leeway: i64,
}

impl ValidationPolicy {
    /// Negative leeway is clamped to zero
    pub fn new(required_claims: Vec<String>, leeway: i64) -> Self {
        Self {
            required_claims,
            leeway: leeway.max(0),
        }
    }

    pub fn required_claims(&self) -> &[String] {
        &self.required_claims
    }

    pub fn leeway(&self) -> i64 {
        self.leeway
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_claims.iter().any(|claim| claim == name)
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}

/// Claim values a token must carry. `aud` matches when the token audience and
/// the expected audience share at least one value; a list expected for any
/// other claim matches when the token value is one of its entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedClaims(BTreeMap<String, Value>);

impl ExpectedClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        self.with(ISSUER, issuer.into())
    }

    pub fn with_audience(self, audience: Vec<String>) -> Self {
        self.with(AUDIENCE, audience)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Validates token time windows and claim presence/values
#[derive(Clone)]
pub struct ClaimValidator {
    policy: ValidationPolicy,
    clock: Arc<dyn Clock>,
}

impl ClaimValidator {
    pub fn new(policy: ValidationPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn leeway(&self) -> i64 {
        self.policy.leeway
    }

    /// Replace the leeway (negative values clamp to zero)
    pub fn with_leeway(mut self, seconds: i64) -> Self {
        self.policy.leeway = seconds.max(0);
        self
    }

    /// Replace the required claim names
    pub fn with_required_claims(mut self, claims: Vec<String>) -> Self {
        self.policy.required_claims = claims;
        self
    }

    /// Check `exp`, `nbf` and `iat` against the current time
    ///
    /// # Arguments
    ///
    /// * `claims` - Claims to check
    /// * `leeway` - Clock skew tolerance in seconds
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::TokenExpired)` - `exp + leeway` is in the past
    /// * `Err(TokenError::TokenNotYetValid)` - `nbf - leeway` is in the future
    /// * `Err(TokenError::TokenInvalid)` - A required timestamp is missing, a
    ///   timestamp is not numeric, `iat` is in the future or `iat` is after
    ///   `exp`
    pub fn check_timestamps(&self, claims: &ClaimSet, leeway: i64) -> TokenResult<()> {
        let now = self.clock.timestamp();
        let leeway = leeway.max(0);

        let exp = claims.expires_at();
        let nbf = claims.not_before();

        if let Some(exp) = exp {
            if exp.saturating_add(leeway) < now {
                debug!(exp, now, leeway, "Token expired");
                return Err(TokenError::expired(format!(
                    "token expired at {} (now {})",
                    exp, now
                )));
            }
        }

        if let Some(nbf) = nbf {
            if nbf.saturating_sub(leeway) > now {
                debug!(nbf, now, leeway, "Token not yet valid");
                return Err(TokenError::TokenNotYetValid);
            }
        }

        self.timestamp(claims, EXPIRES_AT)?;
        self.timestamp(claims, NOT_BEFORE)?;
        if let Some(iat) = self.timestamp(claims, ISSUED_AT)? {
            if iat.saturating_sub(leeway) > now {
                return Err(TokenError::invalid_claims(format!(
                    "token issued in the future ({} > {})",
                    iat, now
                )));
            }
            if let Some(exp) = exp {
                if iat > exp {
                    return Err(TokenError::invalid_claims("token issued after its expiry"));
                }
            }
        }

        Ok(())
    }

    /// Check required claim presence and expected claim values
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::TokenInvalid)` - A required claim is missing or an
    ///   expected value does not match
    pub fn check_claims(
        &self,
        claims: &ClaimSet,
        required: &[String],
        expected: &ExpectedClaims,
    ) -> TokenResult<()> {
        if let Some(missing) = required.iter().find(|name| !claims.contains(name)) {
            return Err(TokenError::invalid_claims(format!(
                "missing required claim: {}",
                missing
            )));
        }

        for (name, expected_value) in expected.iter() {
            let matches = if name == AUDIENCE {
                let expected_audience = as_string_list(expected_value);
                claims
                    .audience()
                    .iter()
                    .any(|aud| expected_audience.contains(aud))
            } else {
                match (claims.get(name), expected_value) {
                    (None, _) => false,
                    (Some(actual), Value::Array(options)) => options.contains(actual),
                    (Some(actual), expected_value) => actual == expected_value,
                }
            };

            if !matches {
                return Err(TokenError::invalid_claims(format!(
                    "claim {} does not match the expected value",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Run the timestamp checks (optionally) followed by the claim checks,
    /// using this validator's policy. The first failure wins.
    pub fn validate(
        &self,
        claims: &ClaimSet,
        check_timestamps: bool,
        expected: &ExpectedClaims,
    ) -> TokenResult<()> {
        if check_timestamps {
            self.check_timestamps(claims, self.policy.leeway)?;
        }
        self.check_claims(claims, &self.policy.required_claims, expected)
    }

    fn timestamp(&self, claims: &ClaimSet, name: &str) -> TokenResult<Option<i64>> {
        match claims.timestamp(name) {
            Some(value) => Ok(Some(value)),
            None if claims.contains(name) => Err(TokenError::invalid_claims(format!(
                "claim {} is not a numeric date",
                name
            ))),
            None if self.policy.is_required(name) => Err(TokenError::invalid_claims(format!(
                "missing required claim: {}",
                name
            ))),
            None => Ok(None),
        }
    }
}

fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(value) => vec![value.clone()],
        Value::Array(values) => values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
