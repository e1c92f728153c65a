//! Signed token value.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::claims::ClaimSet;

/// JOSE header of a compact token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm name, e.g. `HS256`
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl TokenHeader {
    /// Header for a `JWT` typed token signed with `alg`
    pub fn new(alg: impl Into<String>) -> Self {
        Self {
            alg: alg.into(),
            typ: Some(String::from("JWT")),
            kid: None,
        }
    }
}

/// A decoded compact token: header, claims, signature segment and the
/// original string. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    header: TokenHeader,
    claims: ClaimSet,
    signature: String,
    raw: String,
}

impl Token {
    pub fn new(
        header: TokenHeader,
        claims: ClaimSet,
        signature: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            header,
            claims,
            signature: signature.into(),
            raw: raw.into(),
        }
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Base64url signature segment
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Compact serialization (`header.payload.signature`)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn jti(&self) -> Option<&str> {
        self.claims.jti()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
