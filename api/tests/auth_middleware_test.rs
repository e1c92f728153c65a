//! Integration tests for JWT authentication middleware

mod common;

use actix_web::{test, web, App, HttpResponse};
use serde_json::json;
use tw_api::middleware::auth::{AuthContext, JwtAuth, OptionalAuth};
use tw_shared::errors::ErrorResponse;

use common::{bearer, TestContext, TTL};

async fn protected_handler(auth: AuthContext) -> HttpResponse {
    let role = auth.claims().get("role").cloned();
    HttpResponse::Ok().json(json!({
        "subject": auth.subject,
        "jti": auth.jti,
        "role": role,
    }))
}

async fn optional_handler(auth: OptionalAuth) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "authenticated": auth.0.is_some(),
    }))
}

macro_rules! protected_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.state.clone())
                .wrap(JwtAuth::new())
                .route("/protected", web::get().to(protected_handler)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_middleware_requires_token() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);

    let req = test::TestRequest::get().uri("/protected").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "TOKEN_MISSING");
}

#[actix_web::test]
async fn test_middleware_rejects_malformed_token() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer invalid-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "TOKEN_MALFORMED");
}

#[actix_web::test]
async fn test_middleware_rejects_foreign_signature() {
    let ctx = TestContext::default();
    let other = TestContext::new(tw_shared::config::JwtConfig::new("someone-else"));
    let app = protected_app!(ctx);

    let token = other.issue("42", json!({}));
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "SIGNATURE_INVALID");
}

#[actix_web::test]
async fn test_auth_context_extractor() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);
    let token = ctx.issue("user-1", json!({"role": "admin"}));

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(bearer(&token))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["subject"], "user-1");
    assert_eq!(body["jti"], token.jti().unwrap());
    assert_eq!(body["role"], "admin");
}

#[actix_web::test]
async fn test_token_accepted_from_query_and_cookie() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);
    let token = ctx.issue("user-1", json!({}));

    let req = test::TestRequest::get()
        .uri(&format!("/protected?token={}", token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get()
        .uri("/protected")
        .cookie(actix_web::cookie::Cookie::new("token", token.to_string()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_web::test]
async fn test_expired_token_rejected() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);
    let token = ctx.issue("user-1", json!({}));

    ctx.clock.advance(TTL + 1);
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "TOKEN_EXPIRED");
}

#[actix_web::test]
async fn test_revoked_token_rejected() {
    let ctx = TestContext::default();
    let app = protected_app!(ctx);
    let token = ctx.issue("user-1", json!({}));
    ctx.state.tokens.invalidate(&token, false).await.unwrap();

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_optional_auth_passes_without_token() {
    let ctx = TestContext::default();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .wrap(JwtAuth::optional())
            .route("/maybe", web::get().to(optional_handler)),
    )
    .await;

    let req = test::TestRequest::get().uri("/maybe").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["authenticated"], false);

    let token = ctx.issue("user-1", json!({}));
    let req = test::TestRequest::get()
        .uri("/maybe")
        .insert_header(bearer(&token))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["authenticated"], true);

    let req = test::TestRequest::get()
        .uri("/maybe")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn test_missing_state_is_server_error() {
    let app = test::init_service(
        App::new()
            .wrap(JwtAuth::new())
            .route("/protected", web::get().to(protected_handler)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Bearer a.b.c"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "CONFIG_ERROR");
}

#[actix_web::test]
async fn test_body_token_is_not_read_by_middleware() {
    let ctx = TestContext::default();
    let app = test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .wrap(JwtAuth::new())
            .route("/protected", web::post().to(protected_handler)),
    )
    .await;
    let token = ctx.issue("user-1", json!({}));

    let req = test::TestRequest::post()
        .uri("/protected")
        .set_json(json!({"token": token.as_str()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "TOKEN_MISSING");

    let req = test::TestRequest::post()
        .uri("/protected")
        .insert_header(bearer(&token))
        .set_json(json!({"token": "ignored"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}
