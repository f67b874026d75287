//! Credential verification.
//!
//! Stored hashes are either Argon2 PHC strings (`$argon2id$...`) or legacy
//! bcrypt strings (`$2a$`, `$2b$`, `$2y$`). Verification is CPU-bound and
//! runs on the blocking pool when called through [`verify_password_blocking`].
//!
//! Neither the plaintext nor the hash is ever logged.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use paydash_core::{AppError, AppResult};

/// Hash a password for storage using Argon2id with a random salt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

/// Check `password` against a stored hash.
///
/// Returns `false` for a mismatch and for any hash it cannot parse; a corrupt
/// hash is never surfaced to the caller as a distinct outcome.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.starts_with("$argon2") {
        return match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored Argon2 hash is malformed");
                false
            }
        };
    }

    if is_bcrypt(stored_hash) {
        return match bcrypt::verify(password, stored_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "Stored bcrypt hash is malformed");
                false
            }
        };
    }

    tracing::warn!("Stored password hash has an unsupported format");
    false
}

/// Runs [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `Internal` only if the blocking task itself fails.
pub async fn verify_password_blocking(password: String, stored_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::internal_with("credential verification failed", e))
}
