//! Response DTOs.

use serde::{Deserialize, Serialize};

use stateless_core::traits::job_handler::RemoteResponse;
use stateless_entity::job::{Job, JobStatus};
use stateless_service::job::JobDetail;

/// Answer of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `true` while the API answers.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// Whether the bucket is reachable with the configured credentials.
    pub storage: bool,
    /// Whether the database answers; `true` for in-process stores.
    pub database: bool,
}

/// Answer of `GET /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsResponse {
    /// Always `true`.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// Ids of jobs that have not completed.
    pub jobs: Vec<i64>,
}

/// Answer of `GET /job/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    /// Always `true`.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// The job with its derived URLs.
    pub response: JobDetail,
}

/// Answer of `POST /job/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    /// Whether the job was created and, when auto-started, started.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// The created job.
    pub job: JobDetail,
    /// What the job handler answered to the start request.
    pub response: Option<RemoteResponse>,
}

/// Job progress reported with a job-scoped processing callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Job id.
    pub id: i64,
    /// Status after recording the outcome.
    pub status: JobStatus,
    /// Number of synced attachments.
    pub synced: usize,
    /// Number of failed attachments.
    pub failed: usize,
    /// Number of attachments without an outcome.
    pub pending: usize,
    /// Ids the handler should process next, at most `bulk_size` of them.
    pub next_batch: Vec<i64>,
}

impl From<&Job> for JobProgress {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            synced: job.synced_items.len(),
            failed: job.failed_items.len(),
            pending: job.pending_items().len(),
            next_batch: job.next_batch(),
        }
    }
}

/// Answer of `GET /process_attachment/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAttachmentResponse {
    /// Whether the attachment synced.
    pub ok: bool,
    /// Human-readable message.
    pub message: String,
    /// Progress of the job the callback belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobProgress>,
}
