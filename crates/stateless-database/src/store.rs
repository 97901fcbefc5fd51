//! Job record store contract.

use async_trait::async_trait;

use stateless_core::result::AppResult;
use stateless_entity::job::{CreateJob, Job, JobUpdate};

/// Persistence for job rows, keyed by job id.
///
/// Implementations must bind every value as a query parameter.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a job with status `new` and return it with its assigned id.
    async fn create(&self, data: &CreateJob) -> AppResult<Job>;

    /// Find a job by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Job>>;

    /// Ids of every job whose status is not `completed`, ascending.
    async fn list_incomplete(&self) -> AppResult<Vec<i64>>;

    /// Apply a partial update, touching `updated_on`. Returns the updated
    /// job, or `None` if it does not exist.
    async fn update(&self, id: i64, update: &JobUpdate) -> AppResult<Option<Job>>;
}
