use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use crate::dto::auth::{RefreshOptions, TokenResponse};
use crate::handlers::error::ApiError;
use crate::request::{parse_body, ActixRequestReader};

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a token for a new one and revokes the old token. The old token
/// is located with the configured parser chain (header, query, body, cookie)
/// and may already be expired as long as its refresh window is still open.
///
/// # Query Parameters
///
/// - `force_forever`: revoke the old token permanently
/// - `reset_claims`: drop the old custom claims and subject
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "token_type": "Bearer",
///     "expires_in": 3600,
///     "expires_at": 1700003600
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed token
/// - 401 Unauthorized: Missing token, bad signature, revoked token or closed refresh window
/// - 500 Internal Server Error: Revocation disabled or signing failure
/// - 503 Service Unavailable: Revocation cache unreachable
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
    options: web::Query<RefreshOptions>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let reader = ActixRequestReader::new(&req).with_body(parse_body(&req, &body));
    let raw = state
        .tokens
        .parser_chain()
        .extract(&reader)
        .ok_or(ApiError::MissingToken)?;

    let token = state
        .tokens
        .refresh(&raw, options.force_forever, options.reset_claims)
        .await?;

    info!(
        jti = token.jti().unwrap_or_default(),
        reset_claims = options.reset_claims,
        "Token refreshed via API"
    );

    let now = token.claims().issued_at().unwrap_or_default();
    Ok(HttpResponse::Ok().json(TokenResponse::new(&token, now)))
}
