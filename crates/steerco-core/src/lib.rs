//! # Steerco Core
//!
//! Shared foundation for the steerco authorization and tenant-routing layer:
//! the role model, the request-denial error taxonomy, the credential-list
//! parser and the immutable process configuration.

pub mod config;
pub mod credentials;
pub mod error;
pub mod role;

pub use config::AppConfig;
pub use credentials::parse_credentials;
pub use error::AuthError;
pub use role::Role;
