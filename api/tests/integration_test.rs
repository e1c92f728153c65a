//! Integration tests for the assembled application

mod common;

use actix_web::{http::header::CONTENT_TYPE, test};
use serde_json::{json, Value};
use tw_api::app::create_app;
use tw_api::dto::auth::{SessionResponse, TokenResponse};
use tw_shared::errors::ErrorResponse;

use common::{bearer, jwt_config, TestContext, NOW, TTL};

#[actix_web::test]
async fn test_health_check() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tokenwarden-api");
}

#[actix_web::test]
async fn test_unknown_route() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/nope").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_session_returns_claims() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let token = ctx.issue("user-1", json!({"role": "admin"}));

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&token))
        .to_request();
    let body: SessionResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.subject.as_deref(), Some("user-1"));
    assert_eq!(body.jti.as_deref(), token.jti());
    assert_eq!(body.expires_at, Some(NOW + TTL));
    assert_eq!(body.claims.get("role"), Some(&json!("admin")));
    assert_eq!(body.claims.get("iss"), Some(&json!("tokenwarden")));
}

#[actix_web::test]
async fn test_refresh_with_header() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({"role": "admin"}));

    ctx.clock.advance(60);
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&old))
        .to_request();
    let body: TokenResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.token_type, "Bearer");
    assert_eq!(body.expires_in, TTL);
    assert_eq!(body.expires_at, Some(NOW + 60 + TTL));

    // New token works and keeps the custom claims
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(("Authorization", format!("Bearer {}", body.access_token)))
        .to_request();
    let session: SessionResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session.subject.as_deref(), Some("user-1"));
    assert_eq!(session.claims.get("role"), Some(&json!("admin")));

    // Old token is revoked
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(bearer(&old))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let error: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(error.error, "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_refresh_with_json_body() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({}));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({"token": old.as_str()}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_refresh_with_form_body() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({}));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(format!("token={}", old))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_refresh_expired_token_inside_window() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({}));

    ctx.clock.advance(TTL + 600);
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&old))
        .to_request();
    let body: TokenResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.expires_at, Some(NOW + TTL + 600 + TTL));
}

#[actix_web::test]
async fn test_refresh_twice_rejected() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({}));

    let first = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&old))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 200);

    let second = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&old))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status(), 401);
    let error: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(error.error, "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_refresh_with_reset_claims() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({"role": "admin"}));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh?reset_claims=true")
        .insert_header(bearer(&old))
        .to_request();
    let body: TokenResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/session")
        .insert_header(("Authorization", format!("Bearer {}", body.access_token)))
        .to_request();
    let session: SessionResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(session.subject, None);
    assert!(!session.claims.contains_key("role"));
}

#[actix_web::test]
async fn test_refresh_without_token() {
    let ctx = TestContext::default();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let error: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(error.error, "TOKEN_MISSING");
}

#[actix_web::test]
async fn test_refresh_disabled_without_revocation() {
    let ctx = TestContext::new(jwt_config().with_revocation(false));
    let app = test::init_service(create_app(ctx.state.clone())).await;
    let old = ctx.issue("user-1", json!({}));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&old))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let error: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(error.error, "CONFIG_ERROR");
}
