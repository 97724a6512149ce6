//! Signup, login, refresh, and logout orchestration.
//!
//! The service itself is stateless; credential-session state lives entirely in
//! refresh-token rows. Handlers stay thin and map `AuthError` straight to the
//! HTTP taxonomy via `IntoResponse`.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::password;
use super::refresh::{RefreshError, RefreshTokenManager};
use super::state::AuthConfig;
use super::storage::{CreateUserOutcome, CredentialStore, UserRecord};
use super::token::AccessTokenCodec;
use super::types::{TokenPairResponse, UserResponse};
use super::utils::valid_email;

#[derive(Debug)]
pub(super) enum AuthError {
    /// Missing or unusable client input.
    Validation(&'static str),
    /// Email already registered, including the insert race path.
    DuplicateEmail,
    /// Unknown email or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// Refresh token that cannot be split into id and secret.
    MalformedToken,
    /// Refresh token absent, revoked, expired, or already rotated.
    InvalidOrExpiredToken,
    /// Refresh secret mismatch or vanished owner.
    InvalidToken,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<RefreshError> for AuthError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Malformed => Self::MalformedToken,
            RefreshError::InvalidOrExpired => Self::InvalidOrExpiredToken,
            RefreshError::Invalid => Self::InvalidToken,
            RefreshError::Internal(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for AuthError {
    /// Internal details are logged server-side only; 401 bodies stay
    /// uninformative to prevent account enumeration.
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::DuplicateEmail => (StatusCode::CONFLICT, "Email already registered"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            Self::MalformedToken => (StatusCode::BAD_REQUEST, "Invalid refresh token format"),
            Self::InvalidOrExpiredToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired refresh token")
            }
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid refresh token"),
            Self::Internal(err) => {
                error!("auth error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    codec: AccessTokenCodec,
    refresh: RefreshTokenManager,
    config: AuthConfig,
}

impl AuthService {
    pub(crate) fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        let codec = AccessTokenCodec::new(&config);
        let refresh = RefreshTokenManager::new(
            store.clone(),
            config.bcrypt_cost(),
            config.refresh_token_days(),
        );
        Self {
            store,
            codec,
            refresh,
            config,
        }
    }

    pub(crate) fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    pub(crate) fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Register a new user; the password hash is never echoed back.
    pub(super) async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserResponse, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("email and password required"));
        }
        if !valid_email(email) {
            return Err(AuthError::Validation("invalid email"));
        }

        // Fast-path duplicate check for a friendly error; the unique
        // constraint below remains the authoritative guard.
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = password::hash(password.to_string(), self.config.bcrypt_cost()).await?;

        match self.store.create_user(email, &password_hash, name).await? {
            CreateUserOutcome::Created(user) => Ok(UserResponse {
                id: user.id.to_string(),
                email: user.email,
                name: user.name,
            }),
            CreateUserOutcome::DuplicateEmail => Err(AuthError::DuplicateEmail),
        }
    }

    /// Verify credentials and mint an access/refresh token pair.
    pub(super) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenPairResponse, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("email and password required"));
        }

        // Unknown email and wrong password take the same exit.
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let matches = password::verify(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        self.token_pair(&user).await
    }

    /// Exchange a refresh token for a fresh pair, rotating it in the process.
    pub(super) async fn refresh(&self, wire: &str) -> Result<TokenPairResponse, AuthError> {
        if wire.is_empty() {
            return Err(AuthError::Validation("refreshToken required"));
        }

        let (user_id, rotated) = self.refresh.consume(wire).await?;

        // The row was valid but the account may have been deleted since.
        let Some(user) = self.store.find_user_by_id(user_id).await? else {
            return Err(AuthError::InvalidToken);
        };

        let access_token = self.codec.sign(user.id, Some(user.email.clone()))?;
        Ok(TokenPairResponse {
            access_token,
            refresh_token: rotated,
            expires_in: self.config.access_token_ttl().to_string(),
        })
    }

    /// Revoke a refresh token. Succeeds whether or not the token exists.
    pub(super) async fn logout(&self, wire: &str) -> Result<(), AuthError> {
        if wire.is_empty() {
            return Err(AuthError::Validation("refreshToken required"));
        }
        if super::utils::split_refresh_token(wire).is_none() {
            return Err(AuthError::MalformedToken);
        }
        self.refresh.revoke(wire).await?;
        Ok(())
    }

    pub(super) async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.store.find_user_by_id(id).await?)
    }

    async fn token_pair(&self, user: &UserRecord) -> Result<TokenPairResponse, AuthError> {
        let access_token = self.codec.sign(user.id, Some(user.email.clone()))?;
        let refresh_token = self.refresh.issue(user.id).await?;
        Ok(TokenPairResponse {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_ttl().to_string(),
        })
    }
}
