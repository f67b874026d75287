//! Authentication core: login, refresh rotation and access token validation.
//!
//! A refresh token is usable only if it parses, its type is `refresh`, and it
//! equals the registry entry for its subject. Every successful login or
//! refresh overwrites that entry, so each refresh token works at most once.

use std::sync::Arc;
use std::time::Duration;

use paydash_core::{AppError, AppResult, Principal};
use paydash_storage::{KeyValueStore, UserLookup, bounded};

use crate::config::AuthConfig;
use crate::password::verify_password_blocking;
use crate::token::{JwtService, REFRESH_TOKEN_TTL, RefreshTokenRegistry, TokenClaims, TokenType};

// =============================================================================
// Types
// =============================================================================

/// A freshly issued access/refresh pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub principal: Principal,
}

// =============================================================================
// Auth Service
// =============================================================================

/// Orchestrates credential checks, token issuance and the refresh registry.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserLookup>,
    registry: RefreshTokenRegistry,
    jwt: Arc<JwtService>,
    access_token_lifetime: Duration,
    conceal_unknown_principal: bool,
    store_timeout: Duration,
}

impl AuthService {
    /// Creates the service from validated configuration.
    ///
    /// `sessions` backs the refresh token registry.
    #[must_use]
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserLookup>,
        sessions: Arc<dyn KeyValueStore>,
    ) -> Self {
        let store_timeout = config.store_timeout();
        Self {
            users,
            registry: RefreshTokenRegistry::new(sessions, store_timeout),
            jwt: Arc::new(JwtService::new(config.jwt_secret.as_bytes())),
            access_token_lifetime: config.access_token_lifetime,
            conceal_unknown_principal: config.conceal_unknown_principal,
            store_timeout,
        }
    }

    /// The codec used to sign and parse tokens.
    #[must_use]
    pub fn jwt(&self) -> &Arc<JwtService> {
        &self.jwt
    }

    /// Verifies credentials and issues a token pair.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no principal has this email (or `Unauthorized` when
    ///   unknown principals are concealed)
    /// - `Unauthorized` if the password does not match
    /// - `Internal` if the user store or registry fails
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        // 1. Look up principal
        let principal = bounded(
            self.store_timeout,
            "users.find_by_email",
            self.users.find_by_email(email),
        )
        .await
        .map_err(|e| AppError::internal_with("failed to look up user", e))?;

        let Some(principal) = principal else {
            tracing::debug!("Login for unknown principal");
            return Err(if self.conceal_unknown_principal {
                AppError::unauthorized("invalid credentials")
            } else {
                AppError::not_found("user not found")
            });
        };

        // 2. Verify credentials
        let valid =
            verify_password_blocking(password.to_string(), principal.password_hash.clone()).await?;
        if !valid {
            tracing::debug!(principal_id = %principal.id, "Login rejected: bad credentials");
            return Err(AppError::unauthorized("invalid credentials"));
        }

        // 3. Issue and persist the pair
        let tokens = self.issue_and_persist(&principal.id).await?;

        tracing::info!(principal_id = %principal.id, "Login succeeded");
        Ok(LoginOutcome { tokens, principal })
    }

    /// Exchanges a refresh token for a new pair, revoking the old one.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is invalid, expired, not a refresh token,
    ///   or no longer the registered one
    /// - `NotFound` if the principal no longer exists
    /// - `Internal` if the user store or registry fails
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        // 1. Parse and verify
        let claims = self.jwt.parse(refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token failed validation");
            AppError::unauthorized("invalid refresh token")
        })?;

        // 2. Check type
        if !claims.is_refresh() {
            return Err(AppError::unauthorized("invalid token type"));
        }

        // 3. Subject
        let subject = claims.sub;

        // 4. Compare against the registry
        let current = self
            .registry
            .get(&subject)
            .await
            .map_err(|e| AppError::internal_with("failed to validate refresh token", e))?;

        if current.as_deref() != Some(refresh_token) {
            // Best-effort cleanup; the outcome is Unauthorized either way
            if let Err(e) = self.registry.delete(&subject).await {
                tracing::warn!(principal_id = %subject, error = %e, "Failed to delete stale refresh token");
            }
            tracing::info!(principal_id = %subject, "Rejected revoked refresh token");
            return Err(AppError::unauthorized("refresh token has been revoked"));
        }

        // 5. Principal must still exist
        let principal = bounded(
            self.store_timeout,
            "users.find_by_id",
            self.users.find_by_id(&subject),
        )
        .await
        .map_err(|e| AppError::internal_with("failed to look up user", e))?
        .ok_or_else(|| AppError::not_found("user not found"))?;

        // 6. Rotate
        let tokens = self.issue_and_persist(&principal.id).await?;

        tracing::debug!(principal_id = %principal.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// Validates a bearer credential for a protected call.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the token fails verification or is not an
    /// access token.
    pub fn validate_access_token(&self, token: &str) -> AppResult<TokenClaims> {
        let claims = self.jwt.parse(token).map_err(|e| {
            tracing::debug!(error = %e, "Access token failed validation");
            AppError::unauthorized("invalid or expired token")
        })?;

        if !claims.is_access() {
            return Err(AppError::unauthorized("invalid token type"));
        }

        Ok(claims)
    }

    /// Issues a pair and stores the refresh token. Tokens are only returned
    /// once the registry write has succeeded.
    async fn issue_and_persist(&self, principal_id: &str) -> AppResult<TokenPair> {
        let access_token = self
            .jwt
            .issue(principal_id, TokenType::Access, self.access_token_lifetime)
            .map_err(|e| AppError::internal_with("failed to issue access token", e))?;
        let refresh_token = self
            .jwt
            .issue(principal_id, TokenType::Refresh, REFRESH_TOKEN_TTL)
            .map_err(|e| AppError::internal_with("failed to issue refresh token", e))?;

        self.registry
            .put(principal_id, &refresh_token, REFRESH_TOKEN_TTL)
            .await
            .map_err(|e| AppError::internal_with("failed to persist refresh token", e))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
