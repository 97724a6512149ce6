//! Authenticated profile endpoint; the simplest consumer of `require_auth`.

use axum::{extract::Extension, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::error;

use super::principal::{require_auth, AuthRejection};
use super::state::AuthState;
use super::types::MeResponse;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = MeResponse),
        (status = 401, description = "Missing, malformed, or expired bearer token"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn me(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let principal = match require_auth(&headers, &state).await {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match state.service().find_user(principal.user_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(MeResponse {
                id: user.id.to_string(),
                email: user.email,
                name: user.name,
            }),
        )
            .into_response(),
        // require_auth already saw the user; a miss here means it raced a delete.
        Ok(None) => AuthRejection::UserGone.into_response(),
        Err(err) => {
            error!("failed to load profile: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
