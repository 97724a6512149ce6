//! Stateless HS256 access tokens.
//!
//! Tokens carry identity claims only; no store lookup is needed to check the
//! signature. Callers that must handle deleted accounts re-check the subject
//! against the credential store after verification.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::AuthConfig;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AccessTokenError {
    /// The expiry has passed.
    Expired,
    /// Bad signature, garbled token, or missing claims.
    Invalid,
}

/// Signs and verifies access tokens with the process-wide secret.
pub(crate) struct AccessTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl AccessTokenCodec {
    pub(super) fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret().expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds: config.access_token_ttl_seconds(),
        }
    }

    /// Sign a token for the given subject; expiry is issuance plus the fixed TTL.
    pub(super) fn sign(&self, user_id: Uuid, email: Option<String>) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email,
            iat: now,
            exp: now + self.ttl_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| anyhow::anyhow!("failed to sign access token: {err}"))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub(crate) fn verify(&self, token: &str) -> Result<Claims, AccessTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock skew allowance; the expiry boundary is exact.
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AccessTokenError::Expired)
                }
                _ => Err(AccessTokenError::Invalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn codec() -> AccessTokenCodec {
        let config = AuthConfig::new(SecretString::from("test-secret".to_string()));
        AccessTokenCodec::new(&config)
    }

    #[test]
    fn sign_then_verify_returns_subject_and_email() -> anyhow::Result<()> {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let token = codec.sign(user_id, Some("a@x.com".to_string()))?;

        let claims = codec.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.exp - claims.iat, 900);
        Ok(())
    }

    #[test]
    fn expired_token_is_distinguished() -> anyhow::Result<()> {
        let codec = codec();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: None,
            iat: now - 120,
            exp: now - 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;

        assert_eq!(codec.verify(&token), Err(AccessTokenError::Expired));
        Ok(())
    }

    #[test]
    fn wrong_secret_is_invalid() -> anyhow::Result<()> {
        let other = AuthConfig::new(SecretString::from("other-secret".to_string()));
        let other = AccessTokenCodec::new(&other);
        let token = other.sign(Uuid::new_v4(), None)?;

        assert_eq!(codec().verify(&token), Err(AccessTokenError::Invalid));
        Ok(())
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            codec().verify("not.a.token"),
            Err(AccessTokenError::Invalid)
        );
    }
}
