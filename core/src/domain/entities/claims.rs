//! Claim set carried by a token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Issuer claim name
pub const ISSUER: &str = "iss";
/// Subject claim name
pub const SUBJECT: &str = "sub";
/// Audience claim name
pub const AUDIENCE: &str = "aud";
/// Expiration time claim name
pub const EXPIRES_AT: &str = "exp";
/// Not-before claim name
pub const NOT_BEFORE: &str = "nbf";
/// Issued-at claim name
pub const ISSUED_AT: &str = "iat";
/// Token identifier claim name
pub const TOKEN_ID: &str = "jti";

/// Registered claims managed by the engine. Callers cannot set these through
/// custom claims.
pub const REGISTERED_CLAIMS: [&str; 7] = [
    ISSUER, SUBJECT, AUDIENCE, EXPIRES_AT, NOT_BEFORE, ISSUED_AT, TOKEN_ID,
];

/// Returns true for one of the registered claim names
pub fn is_registered(name: &str) -> bool {
    REGISTERED_CLAIMS.contains(&name)
}

/// Map of claim name to JSON value, with unique keys.
///
/// A `ClaimSet` is immutable once built; use [`ClaimSetBuilder`] to assemble
/// one and [`ClaimSet::to_builder`] to derive a modified copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Empty claim set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Start a builder
    pub fn builder() -> ClaimSetBuilder {
        ClaimSetBuilder::new()
    }

    /// Builder seeded with a copy of these claims
    pub fn to_builder(&self) -> ClaimSetBuilder {
        ClaimSetBuilder {
            claims: self.0.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Claims that are not registered claims
    pub fn custom_claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(name, _)| !is_registered(name))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str(ISSUER)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str(SUBJECT)
    }

    pub fn jti(&self) -> Option<&str> {
        self.get_str(TOKEN_ID)
    }

    /// Audience values. A single string audience yields a one-element list;
    /// non-string entries of a list are ignored.
    pub fn audience(&self) -> Vec<String> {
        match self.0.get(AUDIENCE) {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|value| value.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.timestamp(ISSUED_AT)
    }

    pub fn not_before(&self) -> Option<i64> {
        self.timestamp(NOT_BEFORE)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.timestamp(EXPIRES_AT)
    }

    /// Numeric date claim in unix seconds. Fractional values are truncated;
    /// non-numeric values yield `None`.
    pub fn timestamp(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs.trunc() as i64))
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Consuming builder for [`ClaimSet`]. Setting a claim twice keeps the last value.
#[derive(Debug, Clone, Default)]
pub struct ClaimSetBuilder {
    claims: Map<String, Value>,
}

impl ClaimSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(self, issuer: impl Into<String>) -> Self {
        self.claim(ISSUER, issuer.into())
    }

    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.claim(SUBJECT, subject.into())
    }

    /// Set the audience; a single value is stored as a string, several as a list
    pub fn audience(self, audience: Vec<String>) -> Self {
        match audience.len() {
            0 => self,
            1 => {
                let value = audience.into_iter().next().unwrap_or_default();
                self.claim(AUDIENCE, value)
            }
            _ => self.claim(AUDIENCE, audience),
        }
    }

    pub fn issued_at(self, timestamp: i64) -> Self {
        self.claim(ISSUED_AT, timestamp)
    }

    pub fn not_before(self, timestamp: i64) -> Self {
        self.claim(NOT_BEFORE, timestamp)
    }

    pub fn expires_at(self, timestamp: i64) -> Self {
        self.claim(EXPIRES_AT, timestamp)
    }

    pub fn jti(self, jti: impl Into<String>) -> Self {
        self.claim(TOKEN_ID, jti.into())
    }

    /// Set an arbitrary claim
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Drop a claim if present
    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn build(self) -> ClaimSet {
        ClaimSet(self.claims)
    }
}
