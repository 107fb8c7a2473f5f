//! Denial taxonomy — every way this layer can refuse a request.
//!
//! All errors are resolved at the gateway boundary: a request either proceeds
//! with a populated auth context or terminates here with one of these. Nothing
//! is retried; a denial is final for that request.

use http::StatusCode;

/// Why a request was refused before reaching domain code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Operator misconfiguration, surfaced verbatim (not security-sensitive).
    #[error("{0}")]
    Configuration(String),

    /// Missing, malformed or unknown credential. One uniform message for all
    /// causes so the response is not an oracle for which one it was.
    #[error("Invalid API key")]
    InvalidCredential,

    /// A route guard ran but no auth context was published for the request.
    #[error("Authentication required")]
    MissingRole,

    /// Authenticated but below the route's minimum role. The held and needed
    /// roles are logged server-side, never put in the body.
    #[error("Insufficient role")]
    Forbidden,

    /// Mutating request with a body whose declared content type is not the
    /// expected structured-data type.
    #[error("Content-Type must be application/json, got '{0}'")]
    PayloadShape(String),

    /// The resolved tenant id has no registry entry. Naming the id leaks
    /// tenant existence, an accepted trade-off for operability.
    #[error("Unknown tenant: {0}")]
    TenantNotFound(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidCredential | AuthError::MissingRole => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::PayloadShape(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AuthError::TenantNotFound(_) => StatusCode::BAD_REQUEST,
        }
    }
}
