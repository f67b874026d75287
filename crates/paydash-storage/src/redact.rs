//! Credential masking for connection URLs before they reach a log line.

/// Masks the password in a connection URL.
///
/// `postgres://user:secret@db/app` becomes `postgres://user:****@db/app`;
/// a password without a user (`redis://:secret@cache`) is masked too. URLs
/// without credentials are returned unchanged.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos >= scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
