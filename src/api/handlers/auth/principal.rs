//! Bearer-token middleware: resolve the `Authorization` header into a
//! `Principal` or reject the request before any downstream handler runs.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use super::state::AuthState;

/// Authenticated user context attached to protected requests.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    MissingHeader,
    MalformedHeader,
    InvalidOrExpiredToken,
    /// The token verified but the subject no longer exists.
    UserGone,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::MissingHeader => (StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            Self::MalformedHeader => (StatusCode::UNAUTHORIZED, "Invalid Authorization header"),
            Self::InvalidOrExpiredToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::UserGone => (StatusCode::UNAUTHORIZED, "User no longer exists"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Verify the bearer access token and re-check that the subject still exists,
/// which catches deleted accounts holding stale-but-unexpired tokens.
pub async fn require_auth(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<Principal, AuthRejection> {
    let token = extract_bearer_token(headers)?;

    let claims = state
        .service()
        .codec()
        .verify(token)
        .map_err(|_| AuthRejection::InvalidOrExpiredToken)?;

    let user = match state.service().store().find_user_by_id(claims.sub).await {
        Ok(user) => user,
        Err(err) => {
            error!("failed to resolve principal: {err:#}");
            return Err(AuthRejection::Internal);
        }
    };
    if user.is_none() {
        return Err(AuthRejection::UserGone);
    }

    Ok(Principal {
        user_id: claims.sub,
        email: claims.email,
    })
}

/// The header must be exactly two space-separated parts: `Bearer <token>`.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?;
    let value = header
        .to_str()
        .map_err(|_| AuthRejection::MalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthRejection::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_header_is_distinguished() {
        assert_eq!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthRejection::MissingHeader)
        );
    }

    #[test]
    fn bearer_header_must_have_exactly_two_parts() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc def")),
            Err(AuthRejection::MalformedHeader)
        );
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer")),
            Err(AuthRejection::MalformedHeader)
        );
        assert_eq!(
            extract_bearer_token(&headers_with("Basic abc")),
            Err(AuthRejection::MalformedHeader)
        );
        // scheme is case-sensitive
        assert_eq!(
            extract_bearer_token(&headers_with("bearer abc")),
            Err(AuthRejection::MalformedHeader)
        );
    }

    #[test]
    fn bearer_header_extracts_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc")), Ok("abc"));
    }
}
