//! Unit tests for claim sets

use serde_json::json;

use crate::domain::entities::claims::{is_registered, ClaimSet};

#[test]
fn test_builder_sets_registered_claims() {
    let claims = ClaimSet::builder()
        .issuer("tokenwarden")
        .subject("user-42")
        .audience(vec!["api".to_string()])
        .issued_at(1_000)
        .not_before(1_000)
        .expires_at(4_600)
        .jti("abc123")
        .build();

    assert_eq!(claims.issuer(), Some("tokenwarden"));
    assert_eq!(claims.subject(), Some("user-42"));
    assert_eq!(claims.audience(), vec!["api"]);
    assert_eq!(claims.get("aud"), Some(&json!("api")));
    assert_eq!(claims.issued_at(), Some(1_000));
    assert_eq!(claims.not_before(), Some(1_000));
    assert_eq!(claims.expires_at(), Some(4_600));
    assert_eq!(claims.jti(), Some("abc123"));
}

#[test]
fn test_multiple_audiences_stored_as_list() {
    let claims = ClaimSet::builder()
        .audience(vec!["a".to_string(), "b".to_string()])
        .build();

    assert_eq!(claims.get("aud"), Some(&json!(["a", "b"])));
    assert_eq!(claims.audience(), vec!["a", "b"]);
}

#[test]
fn test_empty_audience_is_omitted() {
    let claims = ClaimSet::builder().audience(Vec::new()).build();
    assert!(!claims.contains("aud"));
}

#[test]
fn test_timestamps_accept_fractional_seconds() {
    let claims: ClaimSet = serde_json::from_value(json!({
        "exp": 1700000000.75,
        "nbf": "soon"
    }))
    .unwrap();

    assert_eq!(claims.expires_at(), Some(1_700_000_000));
    assert_eq!(claims.not_before(), None);
    assert!(claims.contains("nbf"));
}

#[test]
fn test_custom_claims_exclude_registered() {
    let claims = ClaimSet::builder()
        .subject("user-1")
        .claim("role", "admin")
        .claim("scopes", json!(["read", "write"]))
        .build();

    let custom: Vec<&String> = claims.custom_claims().map(|(name, _)| name).collect();
    assert_eq!(custom, vec!["role", "scopes"]);
    assert!(is_registered("jti"));
    assert!(!is_registered("role"));
}

#[test]
fn test_to_builder_derives_modified_copy() {
    let original = ClaimSet::builder().claim("role", "admin").jti("one").build();
    let derived = original.to_builder().without("jti").claim("role", "user").build();

    assert_eq!(original.jti(), Some("one"));
    assert_eq!(derived.jti(), None);
    assert_eq!(derived.get("role"), Some(&json!("user")));
}

#[test]
fn test_serializes_as_plain_object() {
    let claims: ClaimSet = vec![("sub", json!("user-1")), ("n", json!(3))]
        .into_iter()
        .collect();

    let value = serde_json::to_value(&claims).unwrap();
    assert_eq!(value, json!({"sub": "user-1", "n": 3}));
}
