//! Query string extractors.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::dto::request::ProcessAttachmentQuery;

use super::path::InvalidParams;

/// `?job=&secret=` of a processing callback. A non-numeric `job` is
/// rejected like a malformed path parameter.
#[derive(Debug, Clone, Default)]
pub struct CallbackQuery(pub ProcessAttachmentQuery);

impl<S: Send + Sync> FromRequestParts<S> for CallbackQuery {
    type Rejection = InvalidParams;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<ProcessAttachmentQuery>::from_request_parts(parts, state)
            .await
            .map(|Query(query)| Self(query))
            .map_err(|_| InvalidParams(vec!["job"]))
    }
}
