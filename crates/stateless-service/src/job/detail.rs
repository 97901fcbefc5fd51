//! Job representation with derived endpoint URLs.

use serde::{Deserialize, Serialize};

use stateless_entity::job::Job;

/// Builds the public URLs of the REST endpoints for a job.
#[derive(Debug, Clone)]
pub struct JobLinks {
    root: String,
}

impl JobLinks {
    /// `root` is the public base URL plus namespace, without trailing slash.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of a route under the namespace.
    pub fn root_url(&self, route: &str) -> String {
        format!("{}{route}", self.root)
    }

    /// URL of the job detail endpoint.
    pub fn job_url(&self, id: i64) -> String {
        self.root_url(&format!("/job/{id}"))
    }

    /// URL of a job step endpoint.
    pub fn step_url(&self, id: i64, step: &str) -> String {
        format!("{}/step/{step}", self.job_url(id))
    }

    /// Attach the derived URLs to a job.
    pub fn detail(&self, job: Job) -> JobDetail {
        JobDetail {
            url: self.job_url(job.id),
            url_start: self.step_url(job.id, "start"),
            callback_url: self.root_url("/process_attachment/%data_id%"),
            status_url: self.root_url("/status"),
            job,
        }
    }
}

/// What `GET /job/{id}` returns and what the job handler receives on start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    /// The job row.
    #[serde(flatten)]
    pub job: Job,
    /// This job's detail URL.
    pub url: String,
    /// URL that starts this job.
    pub url_start: String,
    /// Per-attachment processing callback; `%data_id%` is the attachment id.
    pub callback_url: String,
    /// Liveness URL.
    pub status_url: String,
}
