//! Mapping of token errors to HTTP responses

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::{debug, error};
use tw_core::errors::TokenError;
use tw_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Errors returned by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No credential was found by the parser chain
    #[error("No token found in request")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingToken => error_codes::TOKEN_MISSING,
            ApiError::Token(err) => match err {
                TokenError::Config { .. } => error_codes::CONFIG_ERROR,
                TokenError::Signing { .. } => error_codes::SIGNING_ERROR,
                TokenError::MalformedToken { .. } => error_codes::TOKEN_MALFORMED,
                TokenError::SignatureInvalid => error_codes::SIGNATURE_INVALID,
                TokenError::TokenExpired { .. } => error_codes::TOKEN_EXPIRED,
                TokenError::TokenNotYetValid => error_codes::TOKEN_NOT_YET_VALID,
                TokenError::TokenInvalid { .. } if err.is_revoked() => error_codes::TOKEN_REVOKED,
                TokenError::TokenInvalid { .. } => error_codes::TOKEN_INVALID,
                TokenError::RevocationStore { .. } => error_codes::CACHE_ERROR,
            },
        }
    }

    /// Client-facing message. Server-side failures are not described in detail.
    fn public_message(&self) -> String {
        match self {
            ApiError::Token(TokenError::Config { .. }) | ApiError::Token(TokenError::Signing { .. }) => {
                "An internal error occurred".to_string()
            }
            ApiError::Token(TokenError::RevocationStore { .. }) => {
                "Token revocation service is temporarily unavailable".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoErrorResponse for ApiError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.public_message())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Token(err) => match err {
                TokenError::Config { .. } | TokenError::Signing { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                TokenError::MalformedToken { .. } => StatusCode::BAD_REQUEST,
                TokenError::SignatureInvalid
                | TokenError::TokenExpired { .. }
                | TokenError::TokenNotYetValid
                | TokenError::TokenInvalid { .. } => StatusCode::UNAUTHORIZED,
                TokenError::RevocationStore { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            debug!(error = %self, code = self.error_code(), "Request rejected");
        }

        HttpResponse::build(status).json(self.to_error_response())
    }
}
