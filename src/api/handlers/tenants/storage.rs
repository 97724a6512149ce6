//! Shared SQL storage helpers for tenant and plan entities.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::{PgPool, Row};
use tracing::error;
use uuid::Uuid;

use super::types::{PlanResponse, TenantResponse};

#[derive(Debug)]
pub(super) enum TenantError {
    BadRequest(&'static str),
    Conflict(&'static str),
    NotFound(&'static str),
    Database(sqlx::Error),
}

impl IntoResponse for TenantError {
    /// Maps storage-layer failures into stable HTTP responses for handlers.
    /// Database errors are logged server-side and surfaced as `500` without leaking details.
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Database(err) => {
                error!("Database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

const TENANT_COLUMNS: &str = r#"
    id::text AS id,
    name,
    slug,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

const PLAN_COLUMNS: &str = r#"
    id::text AS id,
    tenant_id::text AS tenant_id,
    name,
    price_cents,
    currency,
    interval,
    active,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

fn tenant_from_row(row: &sqlx::postgres::PgRow) -> TenantResponse {
    TenantResponse {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

fn plan_from_row(row: &sqlx::postgres::PgRow) -> PlanResponse {
    PlanResponse {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        name: row.get("name"),
        price_cents: row.get("price_cents"),
        currency: row.get("currency"),
        interval: row.get("interval"),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

/// Lists all tenants, newest first.
pub(super) async fn fetch_tenants(pool: &PgPool) -> Result<Vec<TenantResponse>, sqlx::Error> {
    let query = format!(
        r"
        SELECT {TENANT_COLUMNS}
        FROM tenants
        ORDER BY created_at DESC
        "
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows.iter().map(tenant_from_row).collect())
}

/// Fetches a tenant by id, returning `None` when missing.
pub(super) async fn fetch_tenant_by_id(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Option<TenantResponse>, sqlx::Error> {
    let query = format!(
        r"
        SELECT {TENANT_COLUMNS}
        FROM tenants
        WHERE id = $1
        "
    );
    let row = sqlx::query(&query)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(tenant_from_row))
}

/// Fetches a tenant by its unique slug, returning `None` when missing.
pub(super) async fn fetch_tenant_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<TenantResponse>, sqlx::Error> {
    let query = format!(
        r"
        SELECT {TENANT_COLUMNS}
        FROM tenants
        WHERE slug = $1
        "
    );
    let row = sqlx::query(&query).bind(slug).fetch_optional(pool).await?;
    Ok(row.as_ref().map(tenant_from_row))
}

/// Inserts a new tenant; slug uniqueness conflicts map to `409`.
pub(super) async fn insert_tenant(
    pool: &PgPool,
    name: &str,
    slug: &str,
) -> Result<TenantResponse, TenantError> {
    let query = format!(
        r"
        INSERT INTO tenants (name, slug)
        VALUES ($1, $2)
        RETURNING {TENANT_COLUMNS}
        "
    );
    let insert = sqlx::query(&query).bind(name).bind(slug).fetch_one(pool).await;

    match insert {
        Ok(row) => Ok(tenant_from_row(&row)),
        Err(err) => {
            if is_unique_violation(&err) {
                Err(TenantError::Conflict("Tenant slug already exists"))
            } else {
                Err(TenantError::Database(err))
            }
        }
    }
}

/// Updates a tenant's name and/or slug.
/// Missing rows map to `404` and slug uniqueness conflicts to `409`.
pub(super) async fn update_tenant_record(
    pool: &PgPool,
    tenant_id: Uuid,
    name: Option<&str>,
    slug: Option<&str>,
) -> Result<TenantResponse, TenantError> {
    let query = format!(
        r"
        UPDATE tenants
        SET
            name = COALESCE($1, name),
            slug = COALESCE($2, slug)
        WHERE id = $3
        RETURNING {TENANT_COLUMNS}
        "
    );
    let update = sqlx::query(&query)
        .bind(name)
        .bind(slug)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await;

    match update {
        Ok(Some(row)) => Ok(tenant_from_row(&row)),
        Ok(None) => Err(TenantError::NotFound("Tenant not found")),
        Err(err) => {
            if is_unique_violation(&err) {
                Err(TenantError::Conflict("Slug already taken"))
            } else {
                Err(TenantError::Database(err))
            }
        }
    }
}

/// Deletes a tenant by id, returning `false` when no row matched.
pub(super) async fn delete_tenant_record(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        DELETE FROM tenants
        WHERE id = $1
        ",
    )
    .bind(tenant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `true` when a tenant row exists for `tenant_id`.
pub(super) async fn tenant_exists(pool: &PgPool, tenant_id: Uuid) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r"
        SELECT id
        FROM tenants
        WHERE id = $1
        ",
    )
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Lists a tenant's plans, newest first.
pub(super) async fn fetch_plans_for_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Vec<PlanResponse>, sqlx::Error> {
    let query = format!(
        r"
        SELECT {PLAN_COLUMNS}
        FROM plans
        WHERE tenant_id = $1
        ORDER BY created_at DESC
        "
    );
    let rows = sqlx::query(&query).bind(tenant_id).fetch_all(pool).await?;
    Ok(rows.iter().map(plan_from_row).collect())
}

/// Fetches a plan by id scoped to `tenant_id`, returning `None` when the plan
/// is missing or belongs to a different tenant.
pub(super) async fn fetch_plan_for_tenant(
    pool: &PgPool,
    tenant_id: Uuid,
    plan_id: Uuid,
) -> Result<Option<PlanResponse>, sqlx::Error> {
    let query = format!(
        r"
        SELECT {PLAN_COLUMNS}
        FROM plans
        WHERE id = $1 AND tenant_id = $2
        "
    );
    let row = sqlx::query(&query)
        .bind(plan_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(plan_from_row))
}

/// Inserts a plan under `tenant_id`; a duplicate name within the tenant maps to `409`.
pub(super) async fn insert_plan(
    pool: &PgPool,
    tenant_id: Uuid,
    name: &str,
    price_cents: i32,
    currency: &str,
    interval: &str,
    active: bool,
) -> Result<PlanResponse, TenantError> {
    let query = format!(
        r"
        INSERT INTO plans (tenant_id, name, price_cents, currency, interval, active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {PLAN_COLUMNS}
        "
    );
    let insert = sqlx::query(&query)
        .bind(tenant_id)
        .bind(name)
        .bind(price_cents)
        .bind(currency)
        .bind(interval)
        .bind(active)
        .fetch_one(pool)
        .await;

    match insert {
        Ok(row) => Ok(plan_from_row(&row)),
        Err(err) => {
            if is_unique_violation(&err) {
                Err(TenantError::Conflict(
                    "A plan with this name already exists for the tenant",
                ))
            } else {
                Err(TenantError::Database(err))
            }
        }
    }
}

/// Updates a plan scoped to `tenant_id`, only touching the provided fields.
/// Duplicate names within the tenant map to `409`.
pub(super) async fn update_plan_record(
    pool: &PgPool,
    tenant_id: Uuid,
    plan_id: Uuid,
    name: Option<&str>,
    price_cents: Option<i32>,
    currency: Option<&str>,
    interval: Option<&str>,
    active: Option<bool>,
) -> Result<Option<PlanResponse>, TenantError> {
    let query = format!(
        r"
        UPDATE plans
        SET
            name = COALESCE($1, name),
            price_cents = COALESCE($2, price_cents),
            currency = COALESCE($3, currency),
            interval = COALESCE($4, interval),
            active = COALESCE($5, active)
        WHERE id = $6 AND tenant_id = $7
        RETURNING {PLAN_COLUMNS}
        "
    );
    let update = sqlx::query(&query)
        .bind(name)
        .bind(price_cents)
        .bind(currency)
        .bind(interval)
        .bind(active)
        .bind(plan_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await;

    match update {
        Ok(row) => Ok(row.as_ref().map(plan_from_row)),
        Err(err) => {
            if is_unique_violation(&err) {
                Err(TenantError::Conflict(
                    "A plan with this name already exists for the tenant",
                ))
            } else {
                Err(TenantError::Database(err))
            }
        }
    }
}

/// Deletes a plan scoped to `tenant_id`, returning `false` when no row matched.
pub(super) async fn delete_plan_record(
    pool: &PgPool,
    tenant_id: Uuid,
    plan_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r"
        DELETE FROM plans
        WHERE id = $1 AND tenant_id = $2
        ",
    )
    .bind(plan_id)
    .bind(tenant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `true` when `err` is a database unique-violation (SQLSTATE `23505`).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_error_status_mapping() {
        assert_eq!(
            TenantError::BadRequest("name and slug are required")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TenantError::Conflict("Tenant slug already exists")
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TenantError::NotFound("Tenant not found")
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TenantError::Database(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violation_requires_sqlstate() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
