//! Refresh-token session endpoints: rotation and logout.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::state::AuthState;
use super::types::{RefreshRequest, TokenPairResponse};

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPairResponse),
        (status = 400, description = "Missing or malformed refresh token"),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn refresh(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshRequest>>,
) -> impl IntoResponse {
    let request: RefreshRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match state.service().refresh(&request.refresh_token).await {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 400, description = "Missing or malformed refresh token"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn logout(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshRequest>>,
) -> impl IntoResponse {
    let request: RefreshRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // Revocation is idempotent: a second logout with the same token is still 204.
    match state.service().logout(&request.refresh_token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
