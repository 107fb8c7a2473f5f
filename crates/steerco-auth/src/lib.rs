//! # Steerco Auth
//!
//! The request-time authentication decision pipeline: an ordered chain of
//! guards that turns request facts plus process configuration into
//! allow/deny, and the request-scoped context types published downstream.

pub mod context;
pub mod pipeline;

pub use context::{AuthContext, TenantContext};
pub use pipeline::{authorize, authorize_direct, Decision, RequestFacts};
