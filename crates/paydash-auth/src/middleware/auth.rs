//! Bearer validation at the request boundary.
//!
//! Two entry points share the same checks:
//!
//! - [`authentication_middleware`] for whole route groups; it stores the
//!   [`AuthContext`] in request extensions
//! - [`BearerAuth`], an extractor for individual handlers
//!
//! A request is rejected with `Unauthorized` if the `Authorization` header is
//! absent, is not a `Bearer` credential, fails token verification, or carries
//! a refresh token.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use paydash_auth::middleware::{AuthState, authentication_middleware};
//!
//! let protected = Router::new()
//!     .route("/dashboard/v1/payments", get(list_payments))
//!     .route_layer(middleware::from_fn_with_state(auth_state, authentication_middleware));
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use paydash_core::{AppError, AppResult};

use crate::service::AuthService;

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include it in the application state and expose it through `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

impl AuthState {
    #[must_use]
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }

    /// Runs every bearer check against the request headers.
    ///
    /// # Errors
    /// Returns `Unauthorized` if any check fails.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthContext> {
        let token = extract_bearer(headers)?;
        let claims = self.service.validate_access_token(token)?;
        Ok(AuthContext::new(claims))
    }
}

/// Extracts the credential from `Authorization: Bearer <token>`.
///
/// The scheme name is matched case-insensitively.
///
/// # Errors
/// Returns `Unauthorized` if the header is absent or malformed.
pub fn extract_bearer(headers: &HeaderMap) -> AppResult<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid authorization header"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized("invalid authorization header"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::unauthorized("invalid authorization header"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("empty bearer token"));
    }

    Ok(token)
}

// =============================================================================
// Authentication Middleware
// =============================================================================

/// Validates the bearer token and injects [`AuthContext`] for downstream
/// handlers. Rejected requests never reach the handler.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match state.authenticate(req.headers()) {
        Ok(auth_context) => {
            tracing::debug!(subject = %auth_context.subject(), "Token validated successfully");
            req.extensions_mut().insert(auth_context);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(path = %req.uri().path(), error = %e, "Bearer authentication failed");
            e.into_response()
        }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor yielding the verified [`AuthContext`].
///
/// Reuses the context stored by [`authentication_middleware`] when present,
/// otherwise validates the request itself.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<AuthContext>() {
            return Ok(BearerAuth(context.clone()));
        }

        let auth_state = AuthState::from_ref(state);
        auth_state.authenticate(&parts.headers).map(BearerAuth)
    }
}
