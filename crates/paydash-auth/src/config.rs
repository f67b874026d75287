//! Authentication configuration.
//!
//! # Example Configuration (TOML)
//!
//! ```toml
//! [auth]
//! jwt_secret = "change-me"
//! access_token_lifetime = "24h"
//! conceal_unknown_principal = false
//! store_timeout_ms = 3000
//! ```

use std::fmt;
use std::time::Duration;

use paydash_storage::DEFAULT_STORE_TIMEOUT;
use serde::{Deserialize, Serialize};

/// Default signing secret. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "dev-secret-replace-me";

/// Authentication settings, loaded once at startup.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric HS256 signing secret.
    pub jwt_secret: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Report an unknown email on login as bad credentials instead of not found.
    pub conceal_unknown_principal: bool,

    /// Budget for each user store or registry call, in milliseconds.
    pub store_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_lifetime: Duration::from_secs(24 * 60 * 60),
            conceal_unknown_principal: false,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl AuthConfig {
    /// Creates a config with the given secret and defaults elsewhere.
    #[must_use]
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_conceal_unknown_principal(mut self, conceal: bool) -> Self {
        self.conceal_unknown_principal = conceal;
        self
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Checks the settings for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.trim().is_empty() {
            return Err("auth.jwt_secret must not be empty".into());
        }
        if self.access_token_lifetime.is_zero() {
            return Err("auth.access_token_lifetime must be greater than zero".into());
        }
        if self.store_timeout_ms == 0 {
            return Err("auth.store_timeout_ms must be greater than zero".into());
        }
        Ok(())
    }

    /// Returns `true` if the development secret is still in use.
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

// Manual Debug so the secret never reaches logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("conceal_unknown_principal", &self.conceal_unknown_principal)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .finish()
    }
}
