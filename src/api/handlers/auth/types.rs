//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshRequest {
    #[serde(default, rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPairResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn signup_request_defaults_missing_fields() -> Result<()> {
        let decoded: SignupRequest = serde_json::from_str("{}")?;
        assert!(decoded.email.is_empty());
        assert!(decoded.password.is_empty());
        assert!(decoded.name.is_none());
        Ok(())
    }

    #[test]
    fn token_pair_uses_camel_case_keys() -> Result<()> {
        let pair = TokenPairResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: "15m".to_string(),
        };
        let value = serde_json::to_value(&pair)?;
        let expires = value
            .get("expiresIn")
            .and_then(serde_json::Value::as_str)
            .context("missing expiresIn")?;
        assert_eq!(expires, "15m");
        assert!(value.get("accessToken").is_some());
        assert!(value.get("refreshToken").is_some());
        Ok(())
    }

    #[test]
    fn user_response_serializes_null_name() -> Result<()> {
        let user = UserResponse {
            id: "id".to_string(),
            email: "a@x.com".to_string(),
            name: None,
        };
        let value = serde_json::to_value(&user)?;
        assert!(value.get("name").is_some_and(serde_json::Value::is_null));
        Ok(())
    }
}
