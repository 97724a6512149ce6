//! Tenant and plan endpoints.
//!
//! Tenants are top-level records identified by a unique, lowercase slug, and
//! plans are billing entries nested under a tenant. Every route requires a
//! valid bearer token. Plans are only addressable through their owning tenant,
//! and a plan that exists under a different tenant answers `404` rather than
//! revealing it elsewhere.
//!
//! The handler modules parse inputs and map the high-level flow while
//! `storage` owns the SQL and response shaping.

pub(crate) mod plans;
pub(crate) mod tenants;

mod storage;
mod types;

pub(crate) use types::{
    CreatePlanRequest, CreateTenantRequest, PlanInterval, PlanResponse, TenantResponse,
    UpdatePlanRequest, UpdateTenantRequest,
};
