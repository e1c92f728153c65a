//! Error types for the token lifecycle and its cache collaborator
//!
//! Every failure the engine can report is a distinct variant so the
//! presentation layer can map them to distinct responses.

use std::fmt;

use thiserror::Error;

/// Why a structurally sound, correctly signed token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// A required claim is missing or a claim value does not match
    Claims,
    /// The token identifier is on the revocation ledger
    Revoked,
    /// The token carries no `jti`, so it cannot be revoked
    MissingIdentifier,
    /// Custom claims tried to override a registered claim
    RegisteredClaim,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Claims => write!(f, "claims"),
            InvalidReason::Revoked => write!(f, "revoked"),
            InvalidReason::MissingIdentifier => write!(f, "missing identifier"),
            InvalidReason::RegisteredClaim => write!(f, "registered claim"),
        }
    }
}

/// Token lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Signing failed: {message}")]
    Signing { message: String },

    #[error("Malformed token: {message}")]
    MalformedToken { message: String },

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Token expired: {message}")]
    TokenExpired { message: String },

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid token ({reason}): {message}")]
    TokenInvalid {
        reason: InvalidReason,
        message: String,
    },

    #[error("Revocation store failure: {message}")]
    RevocationStore { message: String },
}

impl TokenError {
    pub fn config(message: impl Into<String>) -> Self {
        TokenError::Config {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        TokenError::MalformedToken {
            message: message.into(),
        }
    }

    pub fn expired(message: impl Into<String>) -> Self {
        TokenError::TokenExpired {
            message: message.into(),
        }
    }

    pub fn invalid(reason: InvalidReason, message: impl Into<String>) -> Self {
        TokenError::TokenInvalid {
            reason,
            message: message.into(),
        }
    }

    /// Shorthand for a claim-level rejection
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::invalid(InvalidReason::Claims, message)
    }

    /// Whether the token was rejected because it is on the revocation ledger
    pub fn is_revoked(&self) -> bool {
        matches!(
            self,
            TokenError::TokenInvalid {
                reason: InvalidReason::Revoked,
                ..
            }
        )
    }
}

/// Errors raised by TTL cache backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {message}")]
    Connection { message: String },

    #[error("Cache operation failed: {message}")]
    Operation { message: String },
}

impl From<CacheError> for TokenError {
    fn from(err: CacheError) -> Self {
        TokenError::RevocationStore {
            message: err.to_string(),
        }
    }
}
