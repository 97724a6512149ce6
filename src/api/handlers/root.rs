use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Signal that the service is up without touching any dependency.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
