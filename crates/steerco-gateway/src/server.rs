//! HTTP server implementation using Axum.

use crate::state::AppState;
use crate::{guards, routes};
use axum::extract::Request;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::routing::{delete, get};
use axum::Router;
use steerco_core::Role;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and the global enforcement layers.
///
/// Layer order, outermost first: trace, CORS, authentication pipeline, then
/// the tenant initializer. The initializer is always layered and checks the
/// registry mode per request, so a first registration takes effect without a
/// rebuild. Route-level guards sit inside all of these.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/healthz", get(routes::health))
        .route("/ready", get(routes::ready))
        .route("/live", get(routes::live))
        .route("/metrics", get(routes::metrics))
        .route("/api/v1/info", get(routes::info))
        .route("/api/v1/whoami", get(routes::whoami))
        .merge(tenant_admin_routes())
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::resolve_tenant,
        ))
        .layer(from_fn_with_state(state.clone(), crate::middleware::authenticate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Administrative registry surface, admin-only via the declarative role guard.
fn tenant_admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/tenants",
            get(routes::list_tenants).post(routes::register_tenant),
        )
        .route("/api/v1/tenants/{id}", delete(routes::remove_tenant))
        .route("/api/v1/tenants/{id}/database", get(routes::tenant_database))
        .route_layer(from_fn(|req: Request, next: Next| {
            guards::require_role(Role::Admin, req, next)
        }))
}

/// Start the HTTP server.
pub async fn start(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 steerco gateway listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
