//! Opaque refresh tokens: issue, consume-and-rotate, revoke.
//!
//! A wire token is `"<rowId>.<hexSecret>"`. The raw secret never touches the
//! database; only its bcrypt hash is stored, so a store compromise does not
//! yield usable tokens. The row id keeps lookup O(1) by primary key while the
//! secret comparison stays hash-based.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::password;
use super::storage::CredentialStore;
use super::utils::{generate_refresh_secret, split_refresh_token};

#[derive(Debug)]
pub(super) enum RefreshError {
    /// The wire value cannot be split into an id and a non-empty secret.
    Malformed,
    /// Row absent, revoked, past expiry, or lost the rotation race.
    InvalidOrExpired,
    /// The secret does not match the stored hash, or the owner vanished.
    Invalid,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for RefreshError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

pub(super) struct RefreshTokenManager {
    store: Arc<dyn CredentialStore>,
    bcrypt_cost: u32,
    ttl_days: i64,
}

impl RefreshTokenManager {
    pub(super) fn new(store: Arc<dyn CredentialStore>, bcrypt_cost: u32, ttl_days: i64) -> Self {
        Self {
            store,
            bcrypt_cost,
            ttl_days,
        }
    }

    /// Mint a new refresh token for the user and return its wire value.
    pub(super) async fn issue(&self, user_id: Uuid) -> Result<String> {
        let secret = generate_refresh_secret()?;
        let token_hash = password::hash(secret.clone(), self.bcrypt_cost).await?;
        let expires_at = Utc::now() + Duration::days(self.ttl_days);
        let id = self
            .store
            .create_refresh_token(user_id, &token_hash, expires_at)
            .await?;
        Ok(format!("{id}.{secret}"))
    }

    /// Verify and rotate: the consumed row is revoked and a replacement is
    /// issued in the same call. Returns the owning user and the new wire token.
    ///
    /// Single-use is strict: a replayed token fails after its first
    /// legitimate use, and two racing consumers cannot both rotate it.
    pub(super) async fn consume(&self, wire: &str) -> Result<(Uuid, String), RefreshError> {
        let (id, secret) = split_refresh_token(wire).ok_or(RefreshError::Malformed)?;
        // A non-UUID id can never match a row; same response as a missing row.
        let Ok(id) = Uuid::parse_str(id) else {
            return Err(RefreshError::InvalidOrExpired);
        };

        let record = self
            .store
            .find_refresh_token(id)
            .await?
            .ok_or(RefreshError::InvalidOrExpired)?;
        // Expiry boundary is inclusive: a row expiring "now" is already dead.
        if record.revoked || record.expires_at <= Utc::now() {
            return Err(RefreshError::InvalidOrExpired);
        }

        let matches = password::verify(secret.to_string(), record.token_hash.clone()).await?;
        if !matches {
            return Err(RefreshError::Invalid);
        }

        // Conditional update; the loser of a concurrent refresh observes the
        // row already revoked and must not mint a second pair.
        if !self.store.consume_refresh_token(record.id).await? {
            return Err(RefreshError::InvalidOrExpired);
        }

        let rotated = self.issue(record.user_id).await?;
        Ok((record.user_id, rotated))
    }

    /// Revoke a token if it exists. Malformed or unknown tokens are a silent
    /// no-op so revocation leaks no existence information.
    pub(super) async fn revoke(&self, wire: &str) -> Result<()> {
        let Some((id, _secret)) = split_refresh_token(wire) else {
            return Ok(());
        };
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };
        self.store.revoke_refresh_token(id).await
    }
}
