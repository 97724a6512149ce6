//! Request/response types for tenant and plan APIs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTenantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "priceCents")]
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub interval: Option<PlanInterval>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    #[serde(rename = "priceCents")]
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub interval: Option<PlanInterval>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanResponse {
    pub id: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub name: String,
    #[serde(rename = "priceCents")]
    pub price_cents: i32,
    pub currency: String,
    pub interval: String,
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Billing interval; stored as its canonical uppercase string.
#[derive(Debug, Deserialize, Serialize, ToSchema, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanInterval {
    #[default]
    Month,
    Year,
}

impl PlanInterval {
    /// The canonical value used in API payloads and SQL writes.
    pub(super) fn as_str(self) -> &'static str {
        match self {
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }
}
