//! Typed path parameter extractors.
//!
//! Ids must be plain decimal digits. Anything else is rejected with HTTP 400
//! before a handler runs.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use stateless_core::error::ErrorKind;

use crate::error::ApiErrorResponse;

/// Rejection for malformed path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParams(pub Vec<&'static str>);

impl IntoResponse for InvalidParams {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse::new(
            ErrorKind::Validation,
            format!("Invalid parameter(s): {}", self.0.join(", ")),
        );
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Parse a numeric id segment.
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn path_params<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<HashMap<String, String>, InvalidParams> {
    Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map(|Path(params)| params)
        .map_err(|_| InvalidParams(vec!["id"]))
}

fn id_param(params: &HashMap<String, String>) -> Result<i64, InvalidParams> {
    params
        .get("id")
        .and_then(|raw| parse_id(raw))
        .ok_or_else(|| InvalidParams(vec!["id"]))
}

/// Numeric `{id}` of a job route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for JobId {
    type Rejection = InvalidParams;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = path_params(parts, state).await?;
        id_param(&params).map(Self)
    }
}

/// Numeric `{id}` of an attachment route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for AttachmentId {
    type Rejection = InvalidParams;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = path_params(parts, state).await?;
        id_param(&params).map(Self)
    }
}

/// `{id}` and `{step}` of a lifecycle route. The step name is checked by
/// the job controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStepPath {
    /// Job id.
    pub id: i64,
    /// Requested step name.
    pub step: String,
}

impl<S: Send + Sync> FromRequestParts<S> for JobStepPath {
    type Rejection = InvalidParams;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = path_params(parts, state).await?;
        let id = id_param(&params)?;
        let step = params.remove("step").unwrap_or_default();
        Ok(Self { id, step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_digits_only() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("007"), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("+3"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("99999999999999999999"), None);
    }

    #[test]
    fn test_rejection_is_bad_request() {
        let response = InvalidParams(vec!["id"]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
