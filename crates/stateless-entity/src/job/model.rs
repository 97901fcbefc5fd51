//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stateless_core::error::AppError;

use super::action::JobAction;
use super::status::JobStatus;

/// A persisted bulk synchronization job.
///
/// `payload` is fixed at creation. `synced_items` and `failed_items` only
/// ever hold ids from `payload`, and an id appears in at most one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Job identifier, assigned by the store.
    pub id: i64,
    /// Display name.
    pub label: String,
    /// Targeted attachment subset.
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub action: JobAction,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Attachments processed per invocation.
    pub bulk_size: i32,
    /// Attachment ids to process, in order.
    pub payload: Vec<i64>,
    /// Ids that synced.
    pub synced_items: Vec<i64>,
    /// Ids that failed.
    pub failed_items: Vec<i64>,
    /// When the job was created.
    pub created_on: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_on: DateTime<Utc>,
    /// Token the job handler presents on processing callbacks.
    pub callback_secret: String,
}

impl Job {
    /// Payload ids that have no outcome yet, in payload order.
    pub fn pending_items(&self) -> Vec<i64> {
        self.payload
            .iter()
            .copied()
            .filter(|id| !self.synced_items.contains(id) && !self.failed_items.contains(id))
            .collect()
    }

    /// The next `bulk_size` pending ids.
    pub fn next_batch(&self) -> Vec<i64> {
        let size = usize::try_from(self.bulk_size).unwrap_or(1).max(1);
        self.pending_items().into_iter().take(size).collect()
    }

    /// Whether every payload id has an outcome.
    pub fn is_fully_processed(&self) -> bool {
        self.pending_items().is_empty()
    }

    /// Record the outcome of processing one attachment.
    ///
    /// Moves the id between the result lists when a later attempt changes
    /// the outcome. Ids outside the payload are rejected.
    pub fn record_outcome(&mut self, attachment_id: i64, ok: bool) -> Result<(), AppError> {
        if !self.payload.contains(&attachment_id) {
            return Err(AppError::validation(format!(
                "Attachment {attachment_id} is not part of job {}.",
                self.id
            )));
        }

        let (keep, other) = if ok {
            (&mut self.synced_items, &mut self.failed_items)
        } else {
            (&mut self.failed_items, &mut self.synced_items)
        };
        other.retain(|id| *id != attachment_id);
        if !keep.contains(&attachment_id) {
            keep.push(attachment_id);
        }
        Ok(())
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Display name.
    pub label: String,
    /// Targeted attachment subset.
    pub action: JobAction,
    /// Attachments processed per invocation.
    pub bulk_size: i32,
    /// Attachment ids to process.
    pub payload: Vec<i64>,
    /// Callback token.
    pub callback_secret: String,
}

/// Partial update of a job row; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUpdate {
    /// New status.
    pub status: Option<JobStatus>,
    /// Replacement synced list.
    pub synced_items: Option<Vec<i64>>,
    /// Replacement failed list.
    pub failed_items: Option<Vec<i64>>,
}

impl JobUpdate {
    /// Update only the status.
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply to an in-memory job.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(synced) = &self.synced_items {
            job.synced_items = synced.clone();
        }
        if let Some(failed) = &self.failed_items {
            job.failed_items = failed.clone();
        }
    }
}
