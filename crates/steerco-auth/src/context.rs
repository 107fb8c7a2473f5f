//! Request-scoped context — the values this layer publishes to handlers.
//!
//! Both types are created once per request, immutable afterwards, and dropped
//! at request end. They travel as typed request extensions, never through a
//! shared mutable slot.

use serde::Serialize;
use steerco_core::Role;

/// Outcome of a successful authentication: who may act, and as what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// The resolved privilege role, always a member of the role hierarchy.
    pub role: Role,
    /// How the caller authenticated: `dev-mode`, `spa-session`, `basic-auth`,
    /// or the redacted prefix of the presented API key.
    pub credential_id: String,
}

impl AuthContext {
    pub fn new(role: Role, credential_id: impl Into<String>) -> Self {
        Self {
            role,
            credential_id: credential_id.into(),
        }
    }
}

/// The tenant a request is routed to, resolved against the tenant registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub tenant_id: String,
    pub display_name: String,
}
