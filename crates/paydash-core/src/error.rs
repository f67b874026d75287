//! Application error taxonomy.
//!
//! Every failure that reaches a request boundary is one of four kinds. Each
//! kind has a stable wire code (see [`ErrorCode`]) and maps to one HTTP
//! status class. Rendering lives in [`crate::response`].

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;

/// Boxed error used as the optional cause of an internal failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by Paydash operations.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request is malformed, e.g. a required field is missing.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable description.
        message: String,
        /// Optional structured details echoed to the caller.
        details: Option<serde_json::Value>,
    },

    /// Bad credentials, or an invalid, expired, wrong-type or revoked token.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable description.
        message: String,
    },

    /// The principal (or other addressed entity) does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable description.
        message: String,
    },

    /// A dependency failed: store, cache, or token signer.
    ///
    /// `source` is kept for logs and is never rendered to the caller.
    #[error("Internal error: {message}")]
    Internal {
        /// Sanitized description safe to show to callers.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },
}

impl AppError {
    /// Creates a new `BadRequest` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new `BadRequest` error carrying structured details.
    #[must_use]
    pub fn bad_request_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error without a cause.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `Internal` error wrapping its cause.
    #[must_use]
    pub fn internal_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the stable wire code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BadRequest { .. } => ErrorCode::BadRequest,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Returns the HTTP status this error renders as.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.code().status()
    }

    /// Returns the caller-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::Unauthorized { message }
            | Self::NotFound { message }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Stable error codes exposed in the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[serde(rename = "internal_error")]
    Internal,
    NotFound,
    Unauthorized,
    BadRequest,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal_error",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::BadRequest => "bad_request",
        }
    }

    /// Maps the code to its HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
