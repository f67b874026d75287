//! Verified request identity.

use std::sync::Arc;

use crate::token::TokenClaims;

/// Identity established by a valid access token.
///
/// Inserted into request extensions by
/// [`authentication_middleware`](super::authentication_middleware).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Arc<TokenClaims>,
}

impl AuthContext {
    #[must_use]
    pub fn new(claims: TokenClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    /// The principal id the token was issued to.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Token expiration (Unix seconds).
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}
