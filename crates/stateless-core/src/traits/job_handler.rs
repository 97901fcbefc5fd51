//! Remote job-handler service contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// What the job handler answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, parsed as JSON when possible, otherwise a string.
    pub body: serde_json::Value,
}

/// The external service that actually drives a job's batches.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug + 'static {
    /// `POST job/{id}/start` with the job's current representation.
    async fn start(&self, job_id: i64, job: &serde_json::Value) -> AppResult<RemoteResponse>;

    /// `GET job/{id}/{signal}` for `pause`, `resume` and `stop`.
    async fn signal(&self, job_id: i64, signal: &str) -> AppResult<RemoteResponse>;
}
