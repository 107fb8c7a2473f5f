//! Error-to-response mapping: every denial becomes `{"error": ...}` with the
//! status from the taxonomy.

use axum::response::{IntoResponse, Response};
use axum::Json;
use steerco_core::AuthError;
use steerco_tenancy::TenancyError;

/// Newtype so the core error can cross the axum response boundary.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "request refused");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl From<TenancyError> for ApiError {
    fn from(err: TenancyError) -> Self {
        // Registry persistence failures are operator-visible server faults.
        Self(AuthError::Configuration(err.to_string()))
    }
}
