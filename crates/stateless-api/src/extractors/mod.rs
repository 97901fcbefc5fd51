//! Custom Axum extractors.

pub mod path;
pub mod query;

pub use path::{AttachmentId, InvalidParams, JobId, JobStepPath};
pub use query::CallbackQuery;
