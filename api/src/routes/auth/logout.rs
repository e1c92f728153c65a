use actix_web::{web, HttpResponse};

use crate::dto::auth::{LogoutOptions, LogoutResponse};
use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the authenticated token for the configured grace period, or
/// permanently with `?force_forever=true`.
/// Requires authentication via the JWT middleware.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out successfully"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid or already revoked token
/// - 503 Service Unavailable: Revocation cache unreachable
pub async fn logout(
    state: web::Data<AppState>,
    options: web::Query<LogoutOptions>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    state
        .tokens
        .invalidate(&auth.token, options.force_forever)
        .await?;

    Ok(HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
