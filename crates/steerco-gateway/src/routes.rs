//! API route handlers for the gateway.

use crate::error::ApiError;
use crate::guards::{RequireAuth, TenantScope};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use steerco_tenancy::{database_uri, TenantEntry};

/// Health check endpoint. Unauthenticated by pipeline contract.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "steerco",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// Gateway metrics in Prometheus text exposition format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let tenants = state.registry.list().len();
    let body = format!(
        "# TYPE steerco_uptime_seconds gauge\n\
         steerco_uptime_seconds {uptime}\n\
         # TYPE steerco_tenants gauge\n\
         steerco_tenants {tenants}\n"
    );
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Diagnostics: deployment mode, never secrets.
pub async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "steerco",
        "version": env!("CARGO_PKG_VERSION"),
        "multi_tenant": state.registry.is_multi_tenant(),
        "auth_enabled": state.config.auth_enabled,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Who the pipeline decided the caller is, and which tenant the request is
/// scoped to.
pub async fn whoami(RequireAuth(ctx): RequireAuth, TenantScope(tenant): TenantScope) -> Json<Value> {
    Json(json!({
        "role": ctx.role,
        "credential": ctx.credential_id,
        "tenant_id": tenant.as_ref().map(|t| t.tenant_id.as_str()).unwrap_or("default"),
        "tenant_display_name": tenant.as_ref().map(|t| t.display_name.as_str()),
    }))
}

pub async fn list_tenants(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "tenants": state.registry.list() }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterTenantRequest {
    pub tenant_id: String,
    pub backing_store_name: String,
    pub display_name: Option<String>,
}

/// Register (or re-register) a tenant. Insert-or-overwrite by contract, so
/// there is no conflict response.
pub async fn register_tenant(
    State(state): State<AppState>,
    Json(req): Json<RegisterTenantRequest>,
) -> Result<Json<TenantEntry>, ApiError> {
    let entry = state.registry.register(
        &req.tenant_id,
        &req.backing_store_name,
        req.display_name.as_deref(),
    )?;
    Ok(Json(entry))
}

/// Deregister a tenant pointer. `removed: false` covers both the protected
/// default tenant and an id that was never registered.
pub async fn remove_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.registry.remove(&tenant_id)?;
    Ok(Json(json!({ "tenant_id": tenant_id, "removed": removed })))
}

/// Where a tenant's data lives: the resolved backing-store connection string.
pub async fn tenant_database(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let uri = database_uri(&tenant_id, &state.registry, &state.config)?;
    Ok(Json(json!({ "tenant_id": tenant_id, "database_uri": uri })))
}
