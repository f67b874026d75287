//! Request-boundary authentication.

mod auth;
mod types;

pub use auth::{AuthState, BearerAuth, authentication_middleware, extract_bearer};
pub use types::AuthContext;
