//! # Steerco Gateway
//!
//! The HTTP edge of the authorization and tenant-routing layer. Every inbound
//! request passes the authentication pipeline and, in multi-tenant mode, the
//! tenant resolver before any handler runs; routes not behind the global
//! layers use the declarative guards instead.

pub mod error;
pub mod guards;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_router, start};
pub use state::AppState;
