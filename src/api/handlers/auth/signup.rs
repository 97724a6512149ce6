//! Signup endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::state::AuthState;
use super::types::{SignupRequest, UserResponse};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse),
        (status = 400, description = "Missing or invalid email/password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn signup(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match state
        .service()
        .signup(&request.email, &request.password, request.name.as_deref())
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}
