//! Bulk synchronization job entities.

pub mod action;
pub mod model;
pub mod status;
pub mod step;

pub use action::JobAction;
pub use model::{CreateJob, Job, JobUpdate};
pub use status::JobStatus;
pub use step::JobStep;
