//! Lifecycle steps a client can request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stateless_core::error::AppError;

use super::status::JobStatus;

/// A requested lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStep {
    /// Hand the job to the job handler.
    Start,
    /// Halt temporarily.
    Pause,
    /// Continue after a pause.
    Resume,
    /// Halt for good.
    Stop,
}

impl JobStep {
    /// Return the step as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }

    /// Status the job ends up in once the step applies.
    pub fn target(&self) -> JobStatus {
        match self {
            Self::Start | Self::Resume => JobStatus::Running,
            Self::Pause => JobStatus::Paused,
            Self::Stop => JobStatus::Stopped,
        }
    }

    /// Message reported when the step is applied.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Start => "Job started.",
            Self::Pause => "Job paused.",
            Self::Resume => "Job resumed.",
            Self::Stop => "Job stopped.",
        }
    }

    /// Resolve the status after applying this step to `current`.
    ///
    /// A step whose target equals the current status is accepted so the
    /// signal can be re-delivered to the job handler. `resume` only applies
    /// to paused jobs and `start` only to new ones.
    pub fn apply(&self, job_id: i64, current: JobStatus) -> Result<JobStatus, AppError> {
        let target = self.target();
        let allowed = match self {
            Self::Start => current == JobStatus::New || current == target,
            Self::Resume => current == JobStatus::Paused || current == target,
            Self::Pause | Self::Stop => current == target || current.can_transition_to(target),
        };

        if allowed {
            Ok(target)
        } else {
            Err(AppError::validation(format!(
                "Cannot {} job {job_id} while it is {current}.",
                self.as_str()
            )))
        }
    }
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            _ => Err(AppError::validation("Unrecognized step.")),
        }
    }
}
