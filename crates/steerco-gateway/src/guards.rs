//! Per-route declarative guards.
//!
//! Both guards delegate to the same pipeline functions the global middleware
//! uses, so there is a single source of truth for "is this caller allowed"
//! and "is this role sufficient".

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRef, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use steerco_auth::pipeline::authorize_direct;
use steerco_auth::{AuthContext, RequestFacts, TenantContext};
use steerco_core::{AuthError, Role};

/// Require-authentication guard for routes outside the global pipeline.
///
/// Uses the published auth context when the global middleware already ran;
/// otherwise re-evaluates the kill-switch and keyed auth directly. The
/// same-origin and basic-auth bypasses deliberately do not apply here.
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(Self(ctx.clone()));
        }

        let state = AppState::from_ref(state);
        let facts = RequestFacts::new(&parts.method, &parts.uri, &parts.headers);
        authorize_direct(&state.config, &facts)
            .map(Self)
            .map_err(ApiError)
    }
}

/// The tenant scope published by the tenant initializer, absent in
/// single-tenant mode. Infallible by design.
pub struct TenantScope(pub Option<TenantContext>);

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<TenantContext>().cloned()))
    }
}

/// Require-minimum-role guard, applied per route group with
/// `axum::middleware::from_fn`. Missing context is 401; an insufficient role
/// is 403 with the attempted route logged server-side only.
pub async fn require_role(min: Role, req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthContext>() {
        None => ApiError(AuthError::MissingRole).into_response(),
        Some(ctx) if !ctx.role.can_act_as(min) => {
            tracing::warn!(
                route = req.uri().path(),
                held = %ctx.role,
                needed = %min,
                "denied: insufficient role"
            );
            ApiError(AuthError::Forbidden).into_response()
        }
        Some(_) => next.run(req).await,
    }
}
