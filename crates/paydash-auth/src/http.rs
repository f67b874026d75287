//! Login and refresh HTTP handlers.
//!
//! ## Routes
//!
//! - `POST /dashboard/v1/auth/login` `{email, password}` -> `{email, role, token, refreshToken}`
//! - `POST /dashboard/v1/auth/refresh` `{refreshToken}` -> `{token, refreshToken}`

use axum::{
    Json, Router,
    extract::{FromRef, State, rejection::JsonRejection},
    routing::post,
};
use paydash_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::middleware::AuthState;

pub const LOGIN_PATH: &str = "/dashboard/v1/auth/login";
pub const REFRESH_PATH: &str = "/dashboard/v1/auth/refresh";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub role: String,
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::bad_request(format!("invalid request body: {}", rejection.body_text()))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /dashboard/v1/auth/login`
pub async fn login_handler(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(request) = payload.map_err(json_rejection)?;

    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    let outcome = state
        .service
        .login(request.email.trim(), &request.password)
        .await?;

    Ok(Json(LoginResponse {
        email: outcome.principal.email,
        role: outcome.principal.role,
        token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    }))
}

/// `POST /dashboard/v1/auth/refresh`
pub async fn refresh_handler(
    State(state): State<AuthState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<RefreshResponse>> {
    let Json(request) = payload.map_err(json_rejection)?;

    if request.refresh_token.trim().is_empty() {
        return Err(AppError::bad_request("refresh token is required"));
    }

    let tokens = state.service.refresh(request.refresh_token.trim()).await?;

    Ok(Json(RefreshResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// Public authentication routes.
pub fn auth_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    AuthState: FromRef<S>,
{
    Router::new()
        .route(LOGIN_PATH, post(login_handler))
        .route(REFRESH_PATH, post(refresh_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use paydash_core::Principal;
    use paydash_db_memory::{InMemoryKeyValueStore, InMemoryUserStore};
    use tower::ServiceExt;

    use crate::config::AuthConfig;
    use crate::password::hash_password;
    use crate::service::AuthService;

    fn app() -> Router {
        let users = InMemoryUserStore::with_principals([Principal::new(
            "1",
            "cs@test.com",
            hash_password("password").unwrap(),
            "cs",
        )]);
        let service = AuthService::new(
            &AuthConfig::new("test-secret"),
            Arc::new(users),
            Arc::new(InMemoryKeyValueStore::new()),
        );
        auth_routes().with_state(AuthState::new(Arc::new(service)))
    }

    async fn post_json(app: Router, path: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_login_then_refresh() {
        let app = app();

        let (status, body) = post_json(
            app.clone(),
            LOGIN_PATH,
            r#"{"email":"cs@test.com","password":"password"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "cs@test.com");
        assert_eq!(body["role"], "cs");
        assert!(body["token"].is_string());
        let refresh = body["refreshToken"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            app.clone(),
            REFRESH_PATH,
            &format!(r#"{{"refreshToken":"{refresh}"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["refreshToken"].as_str().unwrap(), refresh);

        let (status, body) = post_json(
            app,
            REFRESH_PATH,
            &format!(r#"{{"refreshToken":"{refresh}"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[tokio::test]
    async fn test_login_errors() {
        let (status, body) = post_json(
            app(),
            LOGIN_PATH,
            r#"{"email":"nobody@example.com","password":"x"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");

        let (status, _) = post_json(
            app(),
            LOGIN_PATH,
            r#"{"email":"cs@test.com","password":"wrong"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_is_bad_request() {
        let (status, body) = post_json(app(), REFRESH_PATH, r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "refresh token is required");

        let (status, _) = post_json(app(), REFRESH_PATH, r#"{"refreshToken":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = post_json(app(), LOGIN_PATH, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
    }
}
