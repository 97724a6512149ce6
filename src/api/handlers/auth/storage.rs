//! Credential store: user and refresh-token persistence.
//!
//! The store is a narrow seam so the auth core does not care which engine
//! backs it: Postgres in production, an in-memory map in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone)]
pub(super) struct RefreshTokenRecord {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    pub(super) token_hash: String,
    pub(super) expires_at: DateTime<Utc>,
    pub(super) revoked: bool,
}

/// Outcome when attempting to create a user; the unique-constraint race path
/// surfaces as `DuplicateEmail`, never as a generic failure.
#[derive(Debug)]
pub(super) enum CreateUserOutcome {
    Created(UserRecord),
    DuplicateEmail,
}

#[async_trait]
pub(crate) trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<CreateUserOutcome>;

    async fn find_refresh_token(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>>;

    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid>;

    /// Conditionally flip `revoked` on an unrevoked row. Returns `false` when
    /// the row was absent or already revoked, so concurrent consumers of the
    /// same token are serialized: exactly one caller sees `true`.
    async fn consume_refresh_token(&self, id: Uuid) -> Result<bool>;

    /// Idempotent revocation; unknown ids are a no-op.
    async fn revoke_refresh_token(&self, id: Uuid) -> Result<()>;
}

/// Postgres-backed credential store.
pub(crate) struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = "SELECT id, email, password_hash, name FROM users WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = "SELECT id, email, password_hash, name FROM users WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<CreateUserOutcome> {
        let query = r"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateUserOutcome::Created(user_from_row(&row))),
            Err(err) if is_unique_violation(&err) => Ok(CreateUserOutcome::DuplicateEmail),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn find_refresh_token(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>> {
        let query = r"
            SELECT id, user_id, token_hash, expires_at, revoked
            FROM refresh_tokens
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup refresh token")?;

        Ok(row.map(|row| RefreshTokenRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            token_hash: row.get("token_hash"),
            expires_at: row.get("expires_at"),
            revoked: row.get("revoked"),
        }))
    }

    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let query = r"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert refresh token")?;
        Ok(row.get("id"))
    }

    async fn consume_refresh_token(&self, id: Uuid) -> Result<bool> {
        // The WHERE clause on `revoked` is the rotation guard: under two
        // concurrent consumers only one UPDATE matches.
        let query = r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = $1 AND revoked = FALSE
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to consume refresh token")?;
        Ok(row.is_some())
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<()> {
        let query = r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = $1 AND revoked = FALSE
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to revoke refresh token")?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
pub(super) mod memory {
    //! In-memory store used by the auth service tests.

    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub(in crate::api::handlers::auth) struct MemoryCredentialStore {
        users: Mutex<HashMap<Uuid, UserRecord>>,
        tokens: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
    }

    impl MemoryCredentialStore {
        pub(in crate::api::handlers::auth) fn new() -> Self {
            Self::default()
        }

        /// Insert a token row with an explicit expiry, bypassing the manager.
        pub(in crate::api::handlers::auth) async fn insert_token_row(
            &self,
            user_id: Uuid,
            token_hash: &str,
            expires_at: DateTime<Utc>,
        ) -> Uuid {
            let id = Uuid::new_v4();
            self.tokens.lock().await.insert(
                id,
                RefreshTokenRecord {
                    id,
                    user_id,
                    token_hash: token_hash.to_string(),
                    expires_at,
                    revoked: false,
                },
            );
            id
        }

        pub(in crate::api::handlers::auth) async fn delete_user(&self, id: Uuid) {
            self.users.lock().await.remove(&id);
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .values()
                .find(|user| user.email == email)
                .cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
            Ok(self.users.lock().await.get(&id).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            password_hash: &str,
            name: Option<&str>,
        ) -> Result<CreateUserOutcome> {
            let mut users = self.users.lock().await;
            if users.values().any(|user| user.email == email) {
                return Ok(CreateUserOutcome::DuplicateEmail);
            }
            let record = UserRecord {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                name: name.map(str::to_string),
            };
            users.insert(record.id, record.clone());
            Ok(CreateUserOutcome::Created(record))
        }

        async fn find_refresh_token(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>> {
            Ok(self.tokens.lock().await.get(&id).cloned())
        }

        async fn create_refresh_token(
            &self,
            user_id: Uuid,
            token_hash: &str,
            expires_at: DateTime<Utc>,
        ) -> Result<Uuid> {
            Ok(self.insert_token_row(user_id, token_hash, expires_at).await)
        }

        async fn consume_refresh_token(&self, id: Uuid) -> Result<bool> {
            let mut tokens = self.tokens.lock().await;
            match tokens.get_mut(&id) {
                Some(record) if !record.revoked => {
                    record.revoked = true;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn revoke_refresh_token(&self, id: Uuid) -> Result<()> {
            if let Some(record) = self.tokens.lock().await.get_mut(&id) {
                record.revoked = true;
            }
            Ok(())
        }
    }
}
