//! # stateless-service
//!
//! Business logic for Stateless Media: the attachment processor with its
//! failed-attachment registry and progress markers, and the job controller
//! that drives job lifecycles against the remote job handler.
//!
//! Services follow constructor injection: every collaborator is handed in
//! at construction time as an `Arc<dyn ...>`.

pub mod attachment;
pub mod job;
pub mod locks;

pub use attachment::{AttachmentProcessor, FailedAttachmentRegistry, ProgressMarker};
pub use job::{HttpJobHandler, JobController, JobDetail, JobLinks};
pub use locks::KeyedLocks;
