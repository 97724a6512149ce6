//! Tenant CRUD handlers.
//!
//! Every endpoint requires a valid bearer token and delegates database access
//! to the shared `storage` module. Lookups by an id that does not parse as a
//! UUID behave like any other miss and return `404`.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::super::auth::{AuthState, principal::require_auth};
use super::{
    storage::{
        TenantError, delete_tenant_record, fetch_tenant_by_id, fetch_tenant_by_slug,
        fetch_tenants, insert_tenant, update_tenant_record,
    },
    types::{CreateTenantRequest, TenantResponse, UpdateTenantRequest},
};

pub(super) fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

#[utoipa::path(
    get,
    path = "/api/tenants",
    responses(
        (status = 200, description = "List tenants, newest first.", body = [TenantResponse]),
        (status = 401, description = "Missing or invalid bearer token."),
    ),
    tag = "tenants"
)]
/// Lists all tenants ordered by creation time, newest first.
pub async fn list_tenants(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    match fetch_tenants(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list tenants: {err}");
            TenantError::Database(err).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    params(("id" = String, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "Tenant detail.", body = TenantResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Tenant not found."),
    ),
    tag = "tenants"
)]
/// Fetches a single tenant by id.
pub async fn get_tenant(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let Ok(tenant_id) = Uuid::parse_str(&id) else {
        return TenantError::NotFound("Tenant not found").into_response();
    };

    match fetch_tenant_by_id(&pool, tenant_id).await {
        Ok(Some(tenant)) => (StatusCode::OK, Json(tenant)).into_response(),
        Ok(None) => TenantError::NotFound("Tenant not found").into_response(),
        Err(err) => TenantError::Database(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/tenants/slug/{slug}",
    params(("slug" = String, Path, description = "Tenant slug")),
    responses(
        (status = 200, description = "Tenant detail.", body = TenantResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Tenant not found."),
    ),
    tag = "tenants"
)]
/// Fetches a single tenant by slug. The slug is lowercased and trimmed before
/// lookup so the route accepts the same spellings accepted on create.
pub async fn get_tenant_by_slug(
    Path(slug): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    match fetch_tenant_by_slug(&pool, &normalize_slug(&slug)).await {
        Ok(Some(tenant)) => (StatusCode::OK, Json(tenant)).into_response(),
        Ok(None) => TenantError::NotFound("Tenant not found").into_response(),
        Err(err) => TenantError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created.", body = TenantResponse),
        (status = 400, description = "Missing name or slug."),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 409, description = "Tenant slug already exists."),
    ),
    tag = "tenants"
)]
/// Creates a tenant. The slug is normalized to lowercase and must be unique.
pub async fn create_tenant(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
    payload: Option<Json<CreateTenantRequest>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing payload" })),
        )
            .into_response();
    };

    let name = payload.name.trim();
    let slug = normalize_slug(&payload.slug);
    if name.is_empty() || slug.is_empty() {
        return TenantError::BadRequest("name and slug are required").into_response();
    }

    match insert_tenant(&pool, name, &slug).await {
        Ok(tenant) => (StatusCode::CREATED, Json(tenant)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/tenants/{id}",
    request_body = UpdateTenantRequest,
    params(("id" = String, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "Tenant updated.", body = TenantResponse),
        (status = 400, description = "No fields to update."),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Tenant not found."),
        (status = 409, description = "Slug already taken."),
    ),
    tag = "tenants"
)]
/// Updates a tenant's name and/or slug. At least one field must be provided.
pub async fn update_tenant(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdateTenantRequest>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing payload" })),
        )
            .into_response();
    };

    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let slug = payload
        .slug
        .as_deref()
        .map(normalize_slug)
        .filter(|value| !value.is_empty());

    if name.is_none() && slug.is_none() {
        return TenantError::BadRequest("Provide at least one field to update (name or slug)")
            .into_response();
    }

    let Ok(tenant_id) = Uuid::parse_str(&id) else {
        return TenantError::NotFound("Tenant not found").into_response();
    };

    match update_tenant_record(&pool, tenant_id, name, slug.as_deref()).await {
        Ok(tenant) => (StatusCode::OK, Json(tenant)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    params(("id" = String, Path, description = "Tenant id")),
    responses(
        (status = 204, description = "Tenant deleted."),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Tenant not found."),
    ),
    tag = "tenants"
)]
/// Deletes a tenant and, through cascading constraints, its plans.
pub async fn delete_tenant(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let Ok(tenant_id) = Uuid::parse_str(&id) else {
        return TenantError::NotFound("Tenant not found").into_response();
    };

    match delete_tenant_record(&pool, tenant_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => TenantError::NotFound("Tenant not found").into_response(),
        Err(err) => TenantError::Database(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_slug;

    #[test]
    fn slug_is_lowercased_and_trimmed() {
        assert_eq!(normalize_slug("  FitZone-Gym  "), "fitzone-gym");
        assert_eq!(normalize_slug("plain"), "plain");
        assert_eq!(normalize_slug("   "), "");
    }
}
