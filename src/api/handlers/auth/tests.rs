//! Auth service tests against the in-memory credential store.

use super::password;
use super::service::{AuthError, AuthService};
use super::state::AuthConfig;
use super::storage::memory::MemoryCredentialStore;
use anyhow::Result;
use chrono::Utc;
use secrecy::SecretString;
use std::sync::Arc;
use uuid::Uuid;

// Minimum bcrypt cost keeps these tests fast.
const TEST_COST: u32 = 4;

fn service_with_store() -> (AuthService, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let config = AuthConfig::new(SecretString::from("test-secret".to_string()))
        .with_bcrypt_cost(TEST_COST);
    (AuthService::new(store.clone(), config), store)
}

fn service() -> AuthService {
    service_with_store().0
}

#[tokio::test]
async fn signup_then_login_succeeds() -> Result<()> {
    let service = service();

    let user = service
        .signup("a@x.com", "pw123456", None)
        .await
        .expect("signup should succeed");
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.name, None);
    assert!(Uuid::parse_str(&user.id).is_ok());

    let pair = service
        .login("a@x.com", "pw123456")
        .await
        .expect("login should succeed");
    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_eq!(pair.expires_in, "15m");

    // the access token is usable: it verifies and names the new user
    let claims = service
        .codec()
        .verify(&pair.access_token)
        .expect("access token should verify");
    assert_eq!(claims.sub.to_string(), user.id);
    assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    Ok(())
}

#[tokio::test]
async fn signup_requires_email_and_password() {
    let service = service();
    assert!(matches!(
        service.signup("", "pw123456", None).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        service.signup("a@x.com", "", None).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        service.signup("not-an-email", "pw123456", None).await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn duplicate_email_is_conflict() -> Result<()> {
    let service = service();
    service.signup("a@x.com", "pw123456", None).await.unwrap();

    assert!(matches!(
        service.signup("a@x.com", "other-password", None).await,
        Err(AuthError::DuplicateEmail)
    ));
    Ok(())
}

#[tokio::test]
async fn login_failure_is_uniform_for_unknown_email_and_wrong_password() -> Result<()> {
    let service = service();
    service.signup("a@x.com", "pw123456", None).await.unwrap();

    // wrong password and unknown email map to the same variant
    assert!(matches!(
        service.login("a@x.com", "wrong").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        service.login("nobody@x.com", "pw123456").await,
        Err(AuthError::InvalidCredentials)
    ));
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_old_token_is_single_use() -> Result<()> {
    let service = service();
    service.signup("a@x.com", "pw123456", None).await.unwrap();
    let pair = service.login("a@x.com", "pw123456").await.unwrap();

    let rotated = service
        .refresh(&pair.refresh_token)
        .await
        .expect("first refresh should succeed");
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(!rotated.access_token.is_empty());

    // replaying the consumed token always fails
    assert!(matches!(
        service.refresh(&pair.refresh_token).await,
        Err(AuthError::InvalidOrExpiredToken)
    ));

    // the rotated token is itself good for exactly one more refresh
    let again = service.refresh(&rotated.refresh_token).await.unwrap();
    assert_ne!(again.refresh_token, rotated.refresh_token);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_missing_and_malformed_tokens() {
    let service = service();
    assert!(matches!(
        service.refresh("").await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        service.refresh("no-dot-in-here").await,
        Err(AuthError::MalformedToken)
    ));
}

#[tokio::test]
async fn refresh_rejects_unknown_and_garbled_ids() {
    let service = service();
    // well-formed but unknown row
    let wire = format!("{}.{}", Uuid::new_v4(), "ab".repeat(48));
    assert!(matches!(
        service.refresh(&wire).await,
        Err(AuthError::InvalidOrExpiredToken)
    ));
    // a non-UUID id can never match a row
    assert!(matches!(
        service.refresh("not-a-uuid.secret").await,
        Err(AuthError::InvalidOrExpiredToken)
    ));
}

#[tokio::test]
async fn refresh_rejects_wrong_secret() -> Result<()> {
    let service = service();
    service.signup("a@x.com", "pw123456", None).await.unwrap();
    let pair = service.login("a@x.com", "pw123456").await.unwrap();

    let (id, _secret) = pair.refresh_token.split_once('.').unwrap();
    let forged = format!("{id}.{}", "ff".repeat(48));
    assert!(matches!(
        service.refresh(&forged).await,
        Err(AuthError::InvalidToken)
    ));

    // the stored row is untouched; the real token still works
    assert!(service.refresh(&pair.refresh_token).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn refresh_expiry_boundary_is_inclusive() -> Result<()> {
    let (service, store) = service_with_store();
    let user = service.signup("a@x.com", "pw123456", None).await.unwrap();
    let user_id = Uuid::parse_str(&user.id)?;

    // a row expiring exactly "now" is already expired
    let secret = "aa".repeat(48);
    let hash = password::hash(secret.clone(), TEST_COST).await?;
    let id = store.insert_token_row(user_id, &hash, Utc::now()).await;

    assert!(matches!(
        service.refresh(&format!("{id}.{secret}")).await,
        Err(AuthError::InvalidOrExpiredToken)
    ));
    Ok(())
}

#[tokio::test]
async fn refresh_fails_when_owner_was_deleted() -> Result<()> {
    let (service, store) = service_with_store();
    let user = service.signup("a@x.com", "pw123456", None).await.unwrap();
    let pair = service.login("a@x.com", "pw123456").await.unwrap();

    store.delete_user(Uuid::parse_str(&user.id)?).await;

    assert!(matches!(
        service.refresh(&pair.refresh_token).await,
        Err(AuthError::InvalidToken)
    ));
    Ok(())
}

#[tokio::test]
async fn logout_is_idempotent() -> Result<()> {
    let service = service();
    service.signup("a@x.com", "pw123456", None).await.unwrap();
    let pair = service.login("a@x.com", "pw123456").await.unwrap();

    service.logout(&pair.refresh_token).await.unwrap();
    // second logout with the same token is still a success
    service.logout(&pair.refresh_token).await.unwrap();

    // and the token is gone for refresh purposes
    assert!(matches!(
        service.refresh(&pair.refresh_token).await,
        Err(AuthError::InvalidOrExpiredToken)
    ));
    Ok(())
}

#[tokio::test]
async fn logout_rejects_missing_and_malformed_tokens() {
    let service = service();
    assert!(matches!(
        service.logout("").await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        service.logout("no-dot").await,
        Err(AuthError::MalformedToken)
    ));
    // unknown but well-formed tokens succeed silently
    let wire = format!("{}.secret", Uuid::new_v4());
    assert!(service.logout(&wire).await.is_ok());
}

#[tokio::test]
async fn concurrent_refresh_only_rotates_once() -> Result<()> {
    let service = Arc::new(service());
    service.signup("a@x.com", "pw123456", None).await.unwrap();
    let pair = service.login("a@x.com", "pw123456").await.unwrap();

    let first = {
        let service = service.clone();
        let wire = pair.refresh_token.clone();
        tokio::spawn(async move { service.refresh(&wire).await })
    };
    let second = {
        let service = service.clone();
        let wire = pair.refresh_token.clone();
        tokio::spawn(async move { service.refresh(&wire).await })
    };

    let outcomes = [first.await?, second.await?];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    // at most one concurrent consumer may rotate the token
    assert!(successes <= 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(matches!(
                err,
                AuthError::InvalidOrExpiredToken | AuthError::InvalidToken
            ));
        }
    }
    Ok(())
}
