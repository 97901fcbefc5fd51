//! Structured outcomes returned across component boundaries.
//!
//! Failures are carried inside these values with `ok = false`; they never
//! escape a component as an `Err`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::traits::job_handler::RemoteResponse;

/// Outcome of processing a single attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Whether the attachment synced.
    pub ok: bool,
    /// Human-readable description of what happened.
    pub message: String,
}

impl ProcessResult {
    /// A successful outcome.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    /// A failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl From<AppError> for ProcessResult {
    fn from(err: AppError) -> Self {
        Self::failure(err.message)
    }
}

/// Outcome of a job lifecycle step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether the step was applied and delivered.
    pub ok: bool,
    /// Human-readable description of what happened.
    pub message: String,
    /// What the job handler answered, when it was contacted.
    pub response: Option<RemoteResponse>,
}

impl StepResult {
    /// A failed step that never reached the job handler.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            response: None,
        }
    }
}

impl From<AppError> for StepResult {
    fn from(err: AppError) -> Self {
        Self::rejected(err.message)
    }
}
