//! Auth configuration and shared state.

use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::sync::Arc;

use super::service::AuthService;

const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_ACCESS_TOKEN_TTL: &str = "15m";
const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 30;

/// Process-wide auth settings, built once at startup and passed by reference.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    bcrypt_cost: u32,
    access_token_ttl: String,
    access_token_ttl_seconds: i64,
    refresh_token_days: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        // The default TTL is a compile-time constant, parsing cannot fail.
        let seconds = parse_ttl_seconds(DEFAULT_ACCESS_TOKEN_TTL).unwrap_or(15 * 60);
        Self {
            jwt_secret,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL.to_string(),
            access_token_ttl_seconds: seconds,
            refresh_token_days: DEFAULT_REFRESH_TOKEN_DAYS,
        }
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Set the access-token lifetime from a `"15m"`-style string.
    ///
    /// # Errors
    /// Returns an error when the value does not match the `N[s|m|h|d]` grammar,
    /// so a bad configuration fails at startup rather than at token issuance.
    pub fn with_access_token_ttl(mut self, ttl: String) -> Result<Self> {
        let seconds = parse_ttl_seconds(&ttl)
            .ok_or_else(|| anyhow!("invalid access token TTL: {ttl} (expected e.g. 15m, 1h)"))?;
        self.access_token_ttl = ttl;
        self.access_token_ttl_seconds = seconds;
        Ok(self)
    }

    #[must_use]
    pub fn with_refresh_token_days(mut self, days: i64) -> Self {
        self.refresh_token_days = days;
        self
    }

    pub(super) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    pub(super) fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// The configured lifetime string, echoed as `expiresIn` in token responses.
    pub(super) fn access_token_ttl(&self) -> &str {
        &self.access_token_ttl
    }

    pub(super) fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    pub(super) fn refresh_token_days(&self) -> i64 {
        self.refresh_token_days
    }
}

/// Parse `"90s"`, `"15m"`, `"1h"`, `"7d"` (or a bare number of seconds).
fn parse_ttl_seconds(ttl: &str) -> Option<i64> {
    let ttl = ttl.trim();
    if ttl.is_empty() {
        return None;
    }
    let (value, unit) = match ttl.char_indices().last() {
        Some((index, last)) if last.is_ascii_alphabetic() => (&ttl[..index], last),
        _ => (ttl, 's'),
    };
    let value: i64 = value.parse().ok()?;
    if value <= 0 {
        return None;
    }
    let factor = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 60 * 60 * 24,
        _ => return None,
    };
    value.checked_mul(factor)
}

/// Shared handler state: configuration plus the authentication service.
pub struct AuthState {
    config: AuthConfig,
    service: AuthService,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, service: AuthService) -> Arc<Self> {
        Arc::new(Self { config, service })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ttl_grammar() {
        assert_eq!(parse_ttl_seconds("90"), Some(90));
        assert_eq!(parse_ttl_seconds("90s"), Some(90));
        assert_eq!(parse_ttl_seconds("15m"), Some(900));
        assert_eq!(parse_ttl_seconds("1h"), Some(3600));
        assert_eq!(parse_ttl_seconds("7d"), Some(604_800));
    }

    #[test]
    fn parse_ttl_rejects_garbage() {
        assert_eq!(parse_ttl_seconds(""), None);
        assert_eq!(parse_ttl_seconds("m"), None);
        assert_eq!(parse_ttl_seconds("-1m"), None);
        assert_eq!(parse_ttl_seconds("0s"), None);
        assert_eq!(parse_ttl_seconds("15w"), None);
        assert_eq!(parse_ttl_seconds("fifteen"), None);
    }

    #[test]
    fn auth_config_defaults_and_overrides() -> anyhow::Result<()> {
        let config = AuthConfig::new(SecretString::from("test-secret".to_string()));
        assert_eq!(config.bcrypt_cost(), DEFAULT_BCRYPT_COST);
        assert_eq!(config.access_token_ttl(), "15m");
        assert_eq!(config.access_token_ttl_seconds(), 900);
        assert_eq!(config.refresh_token_days(), DEFAULT_REFRESH_TOKEN_DAYS);

        let config = config
            .with_bcrypt_cost(4)
            .with_access_token_ttl("1h".to_string())?
            .with_refresh_token_days(7);

        assert_eq!(config.bcrypt_cost(), 4);
        assert_eq!(config.access_token_ttl(), "1h");
        assert_eq!(config.access_token_ttl_seconds(), 3600);
        assert_eq!(config.refresh_token_days(), 7);
        Ok(())
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        let config = AuthConfig::new(SecretString::from("test-secret".to_string()));
        assert!(config.with_access_token_ttl("soon".to_string()).is_err());
    }
}
