//! In-memory job store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stateless_core::result::AppResult;
use stateless_entity::job::{CreateJob, Job, JobStatus, JobUpdate};

use crate::store::JobStore;

/// [`JobStore`] over a `BTreeMap`, ids assigned from 1.
#[derive(Debug)]
pub struct MemoryJobStore {
    jobs: RwLock<BTreeMap<i64, Job>>,
    next_id: AtomicI64,
}

impl MemoryJobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            label: data.label.clone(),
            action: data.action,
            status: JobStatus::New,
            bulk_size: data.bulk_size,
            payload: data.payload.clone(),
            synced_items: Vec::new(),
            failed_items: Vec::new(),
            created_on: now,
            updated_on: now,
            callback_secret: data.callback_secret.clone(),
        };
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Job>> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list_incomplete(&self) -> AppResult<Vec<i64>> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.status != JobStatus::Completed)
            .map(|job| job.id)
            .collect())
    }

    async fn update(&self, id: i64, update: &JobUpdate) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(job);
        job.updated_on = Utc::now();
        Ok(Some(job.clone()))
    }
}
