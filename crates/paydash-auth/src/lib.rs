//! Token lifecycle and session authentication for the Paydash backend.
//!
//! - [`password`]: salted hash verification (Argon2id, legacy bcrypt)
//! - [`token`]: HS256 token codec and the refresh token registry
//! - [`service`]: login and refresh-rotation state machine
//! - [`middleware`]: bearer validation for protected routes
//! - [`http`]: login and refresh handlers
//!
//! # Example
//!
//! ```ignore
//! use paydash_auth::{AuthConfig, AuthService, middleware::AuthState};
//!
//! let service = AuthService::new(&config.auth, users, sessions);
//! let auth_state = AuthState::new(Arc::new(service));
//! ```

pub mod config;
pub mod http;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use middleware::{AuthContext, AuthState, BearerAuth};
pub use service::{AuthService, LoginOutcome, TokenPair};
pub use token::{JwtError, JwtService, REFRESH_TOKEN_TTL, TokenClaims, TokenType};
