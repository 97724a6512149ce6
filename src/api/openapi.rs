//! `OpenAPI` document for the HTTP surface.
//!
//! Every documented route carries a `#[utoipa::path]` annotation next to its
//! handler; this module only collects them into a single spec served at
//! `/openapi.json`.

use axum::response::Json;
use utoipa::OpenApi;

use super::handlers::{auth, health, tenants};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "tessera",
        description = "Authentication and session service with tenant and plan management."
    ),
    paths(
        health::health,
        auth::signup::signup,
        auth::login::login,
        auth::session::refresh,
        auth::session::logout,
        auth::me::me,
        tenants::tenants::list_tenants,
        tenants::tenants::get_tenant,
        tenants::tenants::get_tenant_by_slug,
        tenants::tenants::create_tenant,
        tenants::tenants::update_tenant,
        tenants::tenants::delete_tenant,
        tenants::plans::list_plans,
        tenants::plans::get_plan,
        tenants::plans::create_plan,
        tenants::plans::update_plan,
        tenants::plans::delete_plan,
    ),
    components(schemas(
        health::Health,
        auth::types::SignupRequest,
        auth::types::LoginRequest,
        auth::types::RefreshRequest,
        auth::types::UserResponse,
        auth::types::TokenPairResponse,
        auth::types::MeResponse,
        tenants::CreateTenantRequest,
        tenants::UpdateTenantRequest,
        tenants::TenantResponse,
        tenants::CreatePlanRequest,
        tenants::UpdatePlanRequest,
        tenants::PlanResponse,
        tenants::PlanInterval,
    )),
    tags(
        (name = "auth", description = "Signup, login, and session lifecycle"),
        (name = "tenants", description = "Tenant CRUD"),
        (name = "plans", description = "Plan CRUD, nested under a tenant"),
        (name = "health", description = "Service health probe"),
    )
)]
pub struct ApiDoc;

/// Serve the generated spec as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_all_routes() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;
        for path in [
            "/api/health",
            "/api/auth/signup",
            "/api/auth/login",
            "/api/auth/refresh",
            "/api/auth/logout",
            "/api/auth/me",
            "/api/tenants",
            "/api/tenants/{id}",
            "/api/tenants/slug/{slug}",
            "/api/tenants/{tenantId}/plans",
            "/api/tenants/{tenantId}/plans/{planId}",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
