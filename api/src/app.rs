//! Application factory
//!
//! Builds the Actix-web application around shared [`AppState`].

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use crate::middleware::auth::JwtAuth;
use crate::routes::auth::{logout::logout, refresh::refresh, session::session, AppState};

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/refresh", web::post().to(refresh))
                        .route("/logout", web::post().to(logout).wrap(JwtAuth::new()))
                        .route("/session", web::get().to(session).wrap(JwtAuth::new())),
                )
                .route("/", web::get().to(api_documentation)),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tokenwarden-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// API documentation endpoint
async fn api_documentation() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Tokenwarden API v1",
        "endpoints": {
            "health": "/health",
            "auth": {
                "refresh": {
                    "path": "/api/v1/auth/refresh",
                    "method": "POST",
                    "description": "Exchange a token for a new one and revoke the old token",
                    "query": {
                        "force_forever": "bool, revoke the old token permanently",
                        "reset_claims": "bool, drop custom claims and subject"
                    },
                    "responses": {
                        "200": "New token issued",
                        "400": "Malformed token",
                        "401": "Missing, invalid, revoked or unrefreshable token",
                        "503": "Revocation cache unavailable"
                    }
                },
                "logout": {
                    "path": "/api/v1/auth/logout",
                    "method": "POST",
                    "description": "Revoke the presented token",
                    "requires_auth": true,
                    "query": {
                        "force_forever": "bool, revoke permanently instead of for the grace period"
                    }
                },
                "session": {
                    "path": "/api/v1/auth/session",
                    "method": "GET",
                    "description": "Claims of the presented token",
                    "requires_auth": true
                }
            }
        }
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
