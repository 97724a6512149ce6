//! Small helpers for input validation and refresh-token wire handling.

use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use regex::Regex;

/// Entropy of the raw refresh secret before hex encoding.
const REFRESH_TOKEN_BYTES: usize = 48;

/// Basic email format check.
pub(super) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Create a new raw refresh secret, hex-encoded for transport.
/// The raw value is only returned to the client; the database stores a bcrypt hash.
pub(super) fn generate_refresh_secret() -> Result<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate refresh secret")?;
    Ok(hex::encode(bytes))
}

/// Split a wire refresh token `"<id>.<secret>"` on the first dot.
/// The secret may itself contain dots. Returns `None` when either part is empty.
pub(super) fn split_refresh_token(wire: &str) -> Option<(&str, &str)> {
    let (id, secret) = wire.split_once('.')?;
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    Some((id, secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn refresh_secret_is_hex_of_expected_length() {
        let secret = generate_refresh_secret().unwrap();
        assert_eq!(secret.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn split_on_first_dot_only() {
        assert_eq!(split_refresh_token("abc.def"), Some(("abc", "def")));
        // dots in the secret survive the split
        assert_eq!(split_refresh_token("abc.de.f"), Some(("abc", "de.f")));
    }

    #[test]
    fn split_rejects_malformed() {
        assert_eq!(split_refresh_token("no-dot"), None);
        assert_eq!(split_refresh_token(".secret"), None);
        assert_eq!(split_refresh_token("id."), None);
        assert_eq!(split_refresh_token(""), None);
    }
}
