//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /job/create`.
///
/// Every field is optional; an empty body creates an auto-started job over
/// all attachments with a bulk size of one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobRequest {
    /// `regenerate_images`, `sync_non_images`, or empty for everything.
    #[serde(default)]
    pub action: String,
    /// Attachments per handler invocation.
    #[validate(range(min = 1, message = "bulk_size must be at least 1."))]
    pub bulk_size: Option<i32>,
    /// Start the job right after creating it.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl Default for CreateJobRequest {
    fn default() -> Self {
        Self {
            action: String::new(),
            bulk_size: None,
            autostart: default_autostart(),
        }
    }
}

fn default_autostart() -> bool {
    true
}

/// Query string of `GET /process_attachment/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessAttachmentQuery {
    /// Job the callback belongs to.
    pub job: Option<i64>,
    /// The job's callback secret.
    pub secret: Option<String>,
}
