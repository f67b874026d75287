//! Error envelope rendering.
//!
//! Implements `IntoResponse` for [`AppError`] so handlers can return
//! `AppResult<T>` directly. The body is always
//! `{"code": ..., "message": ..., "details": ...?}`.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, ErrorCode};

/// Wire representation of an error.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub code: ErrorCode,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a serde_json::Value>,
}

impl<'a> From<&'a AppError> for ErrorEnvelope<'a> {
    fn from(error: &'a AppError) -> Self {
        let details = match error {
            AppError::BadRequest { details, .. } => details.as_ref(),
            _ => None,
        };
        Self {
            code: error.code(),
            message: error.message(),
            details,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal {
            message,
            source: Some(source),
        } = &self
        {
            tracing::error!(error = %source, "{}", message);
        } else if self.is_server_error() {
            tracing::error!("{}", self.message());
        }

        let status = self.status();
        let mut headers = HeaderMap::new();

        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(self.message());
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        let body = Json(ErrorEnvelope::from(&self));
        (status, headers, body).into_response()
    }
}

/// Builds the `WWW-Authenticate` challenge for 401 responses.
fn build_www_authenticate_header(description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"paydash\", error=\"invalid_token\", error_description=\"{}\"",
        escaped_desc
    )
}
