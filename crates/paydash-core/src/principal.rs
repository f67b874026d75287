//! Authenticated identities.

use serde::{Deserialize, Serialize};

/// A dashboard user.
///
/// Principals are read-only from the point of view of this service; they are
/// provisioned by an administrative path and looked up by email (login) or id
/// (refresh).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    /// Salted one-way hash (Argon2 PHC or bcrypt). Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String,
}

impl Principal {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: role.into(),
        }
    }
}

// Manual Debug so hashes never end up in logs.
impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let principal = Principal::new("u-1", "ops@example.com", "$argon2id$secret", "admin");
        let json = serde_json::to_value(&principal).unwrap();

        assert_eq!(json["id"], "u-1");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let principal = Principal::new("u-1", "ops@example.com", "$argon2id$secret", "admin");
        let debug = format!("{principal:?}");
        assert!(!debug.contains("$argon2id$secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
