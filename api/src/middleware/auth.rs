//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware runs the configured parser chain over the request,
//! validates the token with the shared [`TokenManager`](tw_core::services::TokenManager)
//! and injects an [`AuthContext`] into the request extensions.
//!
//! The middleware works in two modes:
//! 1. Required: requests without a token are rejected with 401
//! 2. Optional: requests without a token pass through unauthenticated
//!
//! In both modes a token that is present but invalid is rejected. Rejections
//! are rendered as JSON error responses rather than propagated as errors.
//!
//! The middleware never reads the request body, so `body` steps of the parser
//! chain do not match here. Endpoints that accept a token in the body (such as
//! refresh) run the chain themselves with the parsed payload.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::debug;
use tw_core::domain::{ClaimSet, Token};
use tw_core::errors::TokenError;

use crate::handlers::error::ApiError;
use crate::request::ActixRequestReader;
use crate::routes::auth::AppState;

/// Authentication context injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject of the token, if any
    pub subject: Option<String>,
    /// JWT ID for tracking and revocation
    pub jti: Option<String>,
    /// The validated token
    pub token: Token,
}

impl AuthContext {
    /// Creates a new authentication context from a validated token
    pub fn from_token(token: Token) -> Self {
        Self {
            subject: token.subject().map(str::to_string),
            jti: token.jti().map(str::to_string),
            token,
        }
    }

    pub fn claims(&self) -> &ClaimSet {
        self.token.claims()
    }
}

/// JWT authentication middleware factory
///
/// Tokens are looked up in headers, the query string and cookies only; a
/// chain consisting solely of `body` steps finds no token on wrapped routes.
#[derive(Debug, Clone, Copy)]
pub struct JwtAuth {
    required: bool,
}

impl JwtAuth {
    /// Creates a middleware that rejects requests without a token
    pub fn new() -> Self {
        Self { required: true }
    }

    /// Creates a middleware that lets requests without a token through
    pub fn optional() -> Self {
        Self { required: false }
    }
}

impl Default for JwtAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    required: bool,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                let error = ApiError::from(TokenError::config(
                    "token manager is not registered as app data",
                ));
                return Ok(req.error_response(error).map_into_right_body());
            };

            let result = {
                let reader = ActixRequestReader::new(req.request());
                state.tokens.parse_from_request(&reader).await
            };

            match result {
                Ok(Some(token)) => {
                    req.extensions_mut().insert(AuthContext::from_token(token));
                }
                Ok(None) if required => {
                    return Ok(req
                        .error_response(ApiError::MissingToken)
                        .map_into_right_body());
                }
                Ok(None) => debug!(path = %req.path(), "Unauthenticated request"),
                Err(e) => {
                    return Ok(req.error_response(ApiError::from(e)).map_into_right_body());
                }
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::MissingToken.into());

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}
