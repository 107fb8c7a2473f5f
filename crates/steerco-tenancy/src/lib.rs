//! # Steerco Tenancy
//!
//! Tenant isolation plumbing: the persisted tenant registry, per-request
//! tenant resolution and the database URI builder that routes a tenant to
//! its backing store.

pub mod registry;
pub mod resolver;

pub use registry::{TenantEntry, TenantRegistry, TenancyError, DEFAULT_TENANT};
pub use resolver::{database_uri, resolve_tenant_id, TENANT_HEADER};
