//! Token issuance, parsing and the refresh token registry.

pub mod jwt;
pub mod registry;

pub use jwt::{JwtError, JwtService, TokenClaims, TokenType};
pub use registry::{REFRESH_TOKEN_TTL, RefreshTokenRegistry};
