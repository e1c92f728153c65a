use actix_web::HttpResponse;

use crate::dto::auth::SessionResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/session
///
/// Returns the claims of the authenticated token.
pub async fn session(auth: AuthContext) -> HttpResponse {
    let claims = auth.claims();
    HttpResponse::Ok().json(SessionResponse {
        expires_at: claims.expires_at(),
        claims: claims.as_map().clone(),
        subject: auth.subject,
        jti: auth.jti,
    })
}
