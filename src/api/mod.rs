use crate::api::handlers::{auth, health, root, tenants};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub(crate) mod handlers;
mod openapi;

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, auth_config: auth::AuthConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(auth::PgCredentialStore::new(pool.clone()));
    let service = auth::AuthService::new(store, auth_config.clone());
    let auth_state = auth::AuthState::new(auth_config, service);

    let app = router().layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(CorsLayer::permissive())
            .layer(Extension(auth_state))
            .layer(Extension(pool)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// Sibling routes under /api/tenants must agree on the `:id` parameter name.
fn router() -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/openapi.json", get(openapi::openapi_json))
        .route("/api/health", get(health::health))
        .route("/api/auth/signup", post(auth::signup::signup))
        .route("/api/auth/login", post(auth::login::login))
        .route("/api/auth/refresh", post(auth::session::refresh))
        .route("/api/auth/logout", post(auth::session::logout))
        .route("/api/auth/me", get(auth::me::me))
        .route(
            "/api/tenants",
            get(tenants::tenants::list_tenants).post(tenants::tenants::create_tenant),
        )
        .route("/api/tenants/slug/:slug", get(tenants::tenants::get_tenant_by_slug))
        .route(
            "/api/tenants/:id",
            get(tenants::tenants::get_tenant)
                .put(tenants::tenants::update_tenant)
                .delete(tenants::tenants::delete_tenant),
        )
        .route(
            "/api/tenants/:id/plans",
            get(tenants::plans::list_plans).post(tenants::plans::create_plan),
        )
        .route(
            "/api/tenants/:id/plans/:plan_id",
            get(tenants::plans::get_plan)
                .put(tenants::plans::update_plan)
                .delete(tenants::plans::delete_plan),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
