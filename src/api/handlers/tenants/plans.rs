//! Plan CRUD handlers, nested under a tenant.
//!
//! A plan is only reachable through its owning tenant, so every lookup is
//! scoped by both ids and a plan belonging to a different tenant answers `404`.

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
        TenantError, delete_plan_record, fetch_plan_for_tenant, fetch_plans_for_tenant,
        insert_plan, tenant_exists, update_plan_record,
    },
    types::{CreatePlanRequest, PlanInterval, PlanResponse, UpdatePlanRequest},
};

const DEFAULT_CURRENCY: &str = "INR";

#[utoipa::path(
    get,
    path = "/api/tenants/{tenantId}/plans",
    params(("tenantId" = String, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "List the tenant's plans, newest first.", body = [PlanResponse]),
        (status = 401, description = "Missing or invalid bearer token."),
    ),
    tag = "plans"
)]
/// Lists a tenant's plans ordered by creation time, newest first.
/// An unknown tenant id yields an empty list.
pub async fn list_plans(
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let Ok(tenant_id) = Uuid::parse_str(&tenant_id) else {
        return (StatusCode::OK, Json(Vec::<PlanResponse>::new())).into_response();
    };

    match fetch_plans_for_tenant(&pool, tenant_id).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list plans: {err}");
            TenantError::Database(err).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tenants/{tenantId}/plans/{planId}",
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("planId" = String, Path, description = "Plan id"),
    ),
    responses(
        (status = 200, description = "Plan detail.", body = PlanResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Plan not found for this tenant."),
    ),
    tag = "plans"
)]
/// Fetches a plan by id, verifying it belongs to the tenant in the path.
pub async fn get_plan(
    Path((tenant_id, plan_id)): Path<(String, String)>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let (Ok(tenant_id), Ok(plan_id)) = (Uuid::parse_str(&tenant_id), Uuid::parse_str(&plan_id))
    else {
        return TenantError::NotFound("Plan not found for this tenant").into_response();
    };

    match fetch_plan_for_tenant(&pool, tenant_id, plan_id).await {
        Ok(Some(plan)) => (StatusCode::OK, Json(plan)).into_response(),
        Ok(None) => TenantError::NotFound("Plan not found for this tenant").into_response(),
        Err(err) => TenantError::Database(err).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/tenants/{tenantId}/plans",
    request_body = CreatePlanRequest,
    params(("tenantId" = String, Path, description = "Tenant id")),
    responses(
        (status = 201, description = "Plan created.", body = PlanResponse),
        (status = 400, description = "Missing name or priceCents."),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Tenant not found."),
        (status = 409, description = "A plan with this name already exists for the tenant."),
    ),
    tag = "plans"
)]
/// Creates a plan for a tenant. `currency` defaults to `INR`, `interval` to
/// `MONTH`, and `active` to `true` when omitted.
pub async fn create_plan(
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
    payload: Option<Json<CreatePlanRequest>>,
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
    if name.is_empty() || payload.price_cents.is_none() {
        return TenantError::BadRequest("name and priceCents are required").into_response();
    }

    let Ok(tenant_id) = Uuid::parse_str(&tenant_id) else {
        return TenantError::NotFound("Tenant not found").into_response();
    };

    // Check the tenant up front for a clear 404 instead of a constraint error.
    match tenant_exists(&pool, tenant_id).await {
        Ok(true) => {}
        Ok(false) => return TenantError::NotFound("Tenant not found").into_response(),
        Err(err) => return TenantError::Database(err).into_response(),
    }

    let price_cents = payload.price_cents.unwrap_or(0);
    let currency = payload
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CURRENCY);
    let interval = payload.interval.unwrap_or_default();
    let active = payload.active.unwrap_or(true);

    match insert_plan(
        &pool,
        tenant_id,
        name,
        price_cents,
        currency,
        interval.as_str(),
        active,
    )
    .await
    {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/tenants/{tenantId}/plans/{planId}",
    request_body = UpdatePlanRequest,
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("planId" = String, Path, description = "Plan id"),
    ),
    responses(
        (status = 200, description = "Plan updated.", body = PlanResponse),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Plan not found for this tenant."),
        (status = 409, description = "A plan with this name already exists for the tenant."),
    ),
    tag = "plans"
)]
/// Updates a plan, touching only the fields present in the payload.
pub async fn update_plan(
    Path((tenant_id, plan_id)): Path<(String, String)>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdatePlanRequest>>,
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

    let (Ok(tenant_id), Ok(plan_id)) = (Uuid::parse_str(&tenant_id), Uuid::parse_str(&plan_id))
    else {
        return TenantError::NotFound("Plan not found for this tenant").into_response();
    };

    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let currency = payload
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let interval = payload.interval.map(PlanInterval::as_str);

    match update_plan_record(
        &pool,
        tenant_id,
        plan_id,
        name,
        payload.price_cents,
        currency,
        interval,
        payload.active,
    )
    .await
    {
        Ok(Some(plan)) => (StatusCode::OK, Json(plan)).into_response(),
        Ok(None) => TenantError::NotFound("Plan not found for this tenant").into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/tenants/{tenantId}/plans/{planId}",
    params(
        ("tenantId" = String, Path, description = "Tenant id"),
        ("planId" = String, Path, description = "Plan id"),
    ),
    responses(
        (status = 204, description = "Plan deleted."),
        (status = 401, description = "Missing or invalid bearer token."),
        (status = 404, description = "Plan not found for this tenant."),
    ),
    tag = "plans"
)]
/// Deletes a plan, verifying tenant ownership first.
pub async fn delete_plan(
    Path((tenant_id, plan_id)): Path<(String, String)>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    if let Err(rejection) = require_auth(&headers, &auth_state).await {
        return rejection.into_response();
    }

    let (Ok(tenant_id), Ok(plan_id)) = (Uuid::parse_str(&tenant_id), Uuid::parse_str(&plan_id))
    else {
        return TenantError::NotFound("Plan not found for this tenant").into_response();
    };

    match delete_plan_record(&pool, tenant_id, plan_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => TenantError::NotFound("Plan not found for this tenant").into_response(),
        Err(err) => TenantError::Database(err).into_response(),
    }
}
