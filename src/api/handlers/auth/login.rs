//! Login endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::state::AuthState;
use super::types::{LoginRequest, TokenPairResponse};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = TokenPairResponse),
        (status = 400, description = "Missing email/password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match state
        .service()
        .login(&request.email, &request.password)
        .await
    {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => err.into_response(),
    }
}
