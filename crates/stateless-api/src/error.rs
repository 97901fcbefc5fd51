//! Maps domain `AppError` to HTTP responses.
//!
//! Gateway failures are reported in-band: HTTP 200 with `ok: false`, the
//! human-readable message, and the machine-readable kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use stateless_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub error: String,
}

impl ApiErrorResponse {
    /// Build a body for `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            error: kind.to_string(),
        }
    }
}

/// Handler error wrapping an [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let AppError { kind, message, .. } = self.0;
        match kind {
            ErrorKind::Database | ErrorKind::Internal => {
                tracing::error!(error = %message, kind = %kind, "Request failed");
            }
            _ => tracing::debug!(error = %message, kind = %kind, "Request rejected"),
        }

        (StatusCode::OK, Json(ApiErrorResponse::new(kind, message))).into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_in_band() {
        let response = ApiError(AppError::not_found("Job 4 not found.")).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_body_carries_kind() {
        let body = ApiErrorResponse::new(ErrorKind::Validation, "Unrecognized step.");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "VALIDATION");
        assert_eq!(json["message"], "Unrecognized step.");
    }
}
