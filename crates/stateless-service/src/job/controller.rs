//! Job controller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use stateless_core::config::JobHandlerConfig;
use stateless_core::error::AppError;
use stateless_core::result::AppResult;
use stateless_core::traits::job_handler::{JobHandler, RemoteResponse};
use stateless_core::traits::media::MediaLibrary;
use stateless_core::types::StepResult;
use stateless_database::store::JobStore;
use stateless_entity::job::{CreateJob, Job, JobAction, JobStatus, JobStep, JobUpdate};

use super::detail::{JobDetail, JobLinks};
use super::secret::{SECRET_LENGTH, generate_secret, secrets_match};
use crate::locks::KeyedLocks;

/// Label given to jobs created without one.
pub const DEFAULT_LABEL: &str = "Stateless Synchronization";

/// Creates jobs and moves them through their lifecycle.
///
/// Status changes are persisted under a per-job lock before the job
/// handler is told about them; delivery is retried separately.
#[derive(Debug, Clone)]
pub struct JobController {
    jobs: Arc<dyn JobStore>,
    library: Arc<dyn MediaLibrary>,
    handler: Arc<dyn JobHandler>,
    locks: Arc<KeyedLocks>,
    links: JobLinks,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl JobController {
    /// Create a controller.
    pub fn new(
        jobs: Arc<dyn JobStore>,
        library: Arc<dyn MediaLibrary>,
        handler: Arc<dyn JobHandler>,
        locks: Arc<KeyedLocks>,
        links: JobLinks,
        config: &JobHandlerConfig,
    ) -> Self {
        Self {
            jobs,
            library,
            handler,
            locks,
            links,
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    fn lock_key(id: i64) -> String {
        format!("job:{id}")
    }

    /// Create a job over every attachment `action` targets.
    pub async fn create(&self, action: &str, bulk_size: Option<i32>) -> AppResult<Job> {
        let action: JobAction = action.parse()?;
        let bulk_size = bulk_size.unwrap_or(1);
        if bulk_size < 1 {
            return Err(AppError::validation("bulk_size must be at least 1."));
        }

        let payload = match action {
            JobAction::RegenerateImages => self.library.image_ids().await?,
            JobAction::SyncNonImages => self.library.other_ids().await?,
            JobAction::All => {
                let mut ids = self.library.image_ids().await?;
                ids.extend(self.library.other_ids().await?);
                ids
            }
        };
        if payload.is_empty() {
            return Err(AppError::validation(
                "There are no attachments to synchronize for this job.",
            ));
        }

        let job = self
            .jobs
            .create(&CreateJob {
                label: DEFAULT_LABEL.to_string(),
                action,
                bulk_size,
                payload,
                callback_secret: generate_secret(SECRET_LENGTH),
            })
            .await?;

        info!(
            job_id = job.id,
            action = %job.action,
            bulk_size,
            items = job.payload.len(),
            "Job created"
        );
        Ok(job)
    }

    /// Ids of every job that has not completed.
    pub async fn list_incomplete(&self) -> AppResult<Vec<i64>> {
        self.jobs.list_incomplete().await
    }

    /// A job with its derived URLs.
    pub async fn detail(&self, id: i64) -> AppResult<JobDetail> {
        Ok(self.links.detail(self.find(id).await?))
    }

    async fn find(&self, id: i64) -> AppResult<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found.")))
    }

    /// Apply a lifecycle step and notify the job handler.
    pub async fn step(&self, id: i64, step: &str) -> StepResult {
        let Ok(step) = step.parse::<JobStep>() else {
            return StepResult::rejected("Unrecognized step.");
        };

        let job = match self.transition(id, step).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id = id, step = %step, error = %e.message, "Job step rejected");
                return StepResult::from(e);
            }
        };

        match self.deliver(&job, step).await {
            Ok(response) => {
                info!(job_id = id, step = %step, status = response.status, "Job step delivered");
                StepResult {
                    ok: true,
                    message: step.success_message().to_string(),
                    response: Some(response),
                }
            }
            Err(e) => {
                warn!(job_id = id, step = %step, error = %e.message, "Job step delivery failed");
                StepResult::rejected(format!("Something went wrong: {}", e.message))
            }
        }
    }

    async fn transition(&self, id: i64, step: JobStep) -> AppResult<Job> {
        let _guard = self.locks.lock(&Self::lock_key(id)).await;

        let job = self.find(id).await?;
        let target = step.apply(id, job.status)?;
        if target == job.status {
            return Ok(job);
        }

        self.jobs
            .update(id, &JobUpdate::status(target))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {id} not found.")))
    }

    async fn deliver(&self, job: &Job, step: JobStep) -> AppResult<RemoteResponse> {
        let body = match step {
            JobStep::Start => Some(serde_json::to_value(self.links.detail(job.clone()))?),
            _ => None,
        };

        let mut attempt = 1;
        loop {
            let result = match &body {
                Some(body) => self.handler.start(job.id, body).await,
                None => self.handler.signal(job.id, step.as_str()).await,
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let backoff = self.retry_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        job_id = job.id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e.message,
                        "Retrying job handler call"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Check a processing callback before any work is done: the secret must
    /// match, the job must be started and not finished, and the attachment
    /// must belong to the job.
    pub async fn verify_callback(
        &self,
        job_id: i64,
        secret: Option<&str>,
        attachment_id: i64,
    ) -> AppResult<()> {
        let job = self.find(job_id).await?;
        if !secrets_match(&job.callback_secret, secret.unwrap_or_default()) {
            return Err(AppError::validation("Invalid callback secret."));
        }
        if job.status == JobStatus::New || job.status.is_terminal() {
            return Err(AppError::validation(format!(
                "Job {job_id} is {} and does not accept results.",
                job.status
            )));
        }
        if !job.payload.contains(&attachment_id) {
            return Err(AppError::validation(format!(
                "Attachment {attachment_id} is not part of job {job_id}."
            )));
        }
        Ok(())
    }

    /// Record a processing outcome on a job, completing it once every
    /// payload item has one.
    pub async fn record_result(&self, job_id: i64, attachment_id: i64, ok: bool) -> AppResult<Job> {
        let _guard = self.locks.lock(&Self::lock_key(job_id)).await;

        let mut job = self.find(job_id).await?;
        job.record_outcome(attachment_id, ok)?;

        let mut update = JobUpdate {
            status: None,
            synced_items: Some(job.synced_items.clone()),
            failed_items: Some(job.failed_items.clone()),
        };
        if job.is_fully_processed() && job.status.can_transition_to(JobStatus::Completed) {
            update.status = Some(JobStatus::Completed);
            info!(
                job_id,
                synced = job.synced_items.len(),
                failed = job.failed_items.len(),
                "Job completed"
            );
        }

        self.jobs
            .update(job_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Job {job_id} not found.")))
    }
}
