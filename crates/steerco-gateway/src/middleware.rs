//! Global request middleware — the auth pipeline and the tenant initializer.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use steerco_auth::pipeline::{authorize, is_bypass_path};
use steerco_auth::{Decision, RequestFacts, TenantContext};
use steerco_core::AuthError;
use steerco_tenancy::{resolve_tenant_id, DEFAULT_TENANT, TENANT_HEADER};

/// Run the authentication pipeline and publish the auth context, or end the
/// request with the pipeline's denial.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let decision = {
        let facts = RequestFacts::new(req.method(), req.uri(), req.headers());
        authorize(&state.config, &facts)
    };

    match decision {
        Decision::Bypass => next.run(req).await,
        Decision::Allow(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Decision::Deny(err) => ApiError(err).into_response(),
    }
}

/// Tenant support initializer: resolve the tenant for this request, abort 400
/// on an unknown one, otherwise publish the tenant context. Health and other
/// bypass paths stay tenant-free. In single-tenant mode no resolution happens
/// and the synthesized default entry scopes every request; the mode is
/// re-checked per request because a first registration flips it at runtime.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_bypass_path(req.uri().path()) {
        return next.run(req).await;
    }

    if !state.registry.is_multi_tenant() {
        if let Some(entry) = state.registry.get(DEFAULT_TENANT) {
            req.extensions_mut().insert(TenantContext {
                tenant_id: entry.tenant_id,
                display_name: entry.display_name,
            });
        }
        return next.run(req).await;
    }

    let header = req.headers().get(TENANT_HEADER).and_then(|v| v.to_str().ok());
    let tenant_id = resolve_tenant_id(header, &state.config);

    match state.registry.get(&tenant_id) {
        Some(entry) => {
            req.extensions_mut().insert(TenantContext {
                tenant_id: entry.tenant_id,
                display_name: entry.display_name,
            });
            next.run(req).await
        }
        None => {
            tracing::warn!(tenant = %tenant_id, path = req.uri().path(), "request for unknown tenant");
            ApiError(AuthError::TenantNotFound(tenant_id)).into_response()
        }
    }
}
