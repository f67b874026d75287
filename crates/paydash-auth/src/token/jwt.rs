//! Token codec: HS256-signed JWTs carrying a type claim.
//!
//! Every token has the claims `sub`, `iat`, `exp`, `jti` and `type`
//! (`"access"` or `"refresh"`). Parsing pins the algorithm to HS256, so a
//! token whose header asserts any other algorithm (including `none`) is
//! rejected before its signature is looked at.
//!
//! ## Example
//!
//! ```ignore
//! use paydash_auth::token::{JwtService, TokenType};
//!
//! let jwt = JwtService::new(b"secret");
//! let token = jwt.issue("42", TokenType::Access, Duration::from_secs(3600))?;
//! let claims = jwt.parse(&token)?;
//! assert_eq!(claims.sub, "42");
//! ```

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
///
/// The variants exist for logging. Callers across a trust boundary must only
/// ever learn that a token is invalid.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The header asserts an algorithm other than HS256.
    #[error("Unexpected signing algorithm")]
    InvalidAlgorithm,

    /// The token is not a well-formed JWT or its claims are missing or invalid.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the problem.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::InvalidAlgorithm,
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Discriminates access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every Paydash token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal id.
    pub sub: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds).
    pub exp: i64,
    /// Unique token id. Two tokens issued in the same second still differ.
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl TokenClaims {
    /// Builds claims valid from now for `ttl`.
    #[must_use]
    pub fn new(subject: impl Into<String>, token_type: TokenType, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            sub: subject.into(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type,
        }
    }

    #[must_use]
    pub fn is_access(&self) -> bool {
        self.token_type == TokenType::Access
    }

    #[must_use]
    pub fn is_refresh(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Issues and parses HS256 tokens with a per-deployment secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Creates a service signing with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs the given claims.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Issues a token of `token_type` for `subject`, expiring after `ttl`.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn issue(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.encode(&TokenClaims::new(subject, token_type, ttl))
    }

    /// Verifies algorithm, signature and expiry, and returns the claims.
    ///
    /// Does not check the token type; that is the caller's decision.
    ///
    /// # Errors
    /// Returns an error if any check fails.
    pub fn parse(&self, token: &str) -> Result<TokenClaims, JwtError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn test_access_round_trip() {
        let service = JwtService::new(SECRET);
        let token = service
            .issue("42", TokenType::Access, Duration::from_secs(3600))
            .unwrap();

        let claims = service.parse(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_type_claim_on_wire() {
        let claims = TokenClaims::new("42", TokenType::Refresh, Duration::from_secs(60));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["sub"], "42");
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let service = JwtService::new(SECRET);
        let a = service
            .issue("42", TokenType::Refresh, Duration::from_secs(60))
            .unwrap();
        let b = service
            .issue("42", TokenType::Refresh, Duration::from_secs(60))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(SECRET);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = TokenClaims {
            sub: "42".into(),
            iat: now - 7200,
            exp: now - 3600,
            jti: "j".into(),
            token_type: TokenType::Access,
        };
        let token = service.encode(&claims).unwrap();

        assert!(matches!(service.parse(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new(SECRET);
        let other = JwtService::new(b"other-secret");
        let token = issuer
            .issue("42", TokenType::Access, Duration::from_secs(60))
            .unwrap();

        assert!(matches!(other.parse(&token), Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let service = JwtService::new(SECRET);
        let claims = TokenClaims::new("42", TokenType::Access, Duration::from_secs(60));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(service.parse(&token), Err(JwtError::InvalidAlgorithm)));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let service = JwtService::new(SECRET);
        let token = service
            .issue("42", TokenType::Access, Duration::from_secs(60))
            .unwrap();
        let payload = token.split('.').nth(1).unwrap();
        // {"alg":"none","typ":"JWT"}
        let forged = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");

        assert!(service.parse(&forged).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let service = JwtService::new(SECRET);
        assert!(service.parse("not-a-token").is_err());
        assert!(service.parse("").is_err());
    }
}
