//! Job status enumeration and its transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a synchronization job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, never started.
    New,
    /// Handed to the job handler and progressing.
    Running,
    /// Temporarily halted; may be resumed.
    Paused,
    /// Halted for good before finishing.
    Stopped,
    /// Every payload item has an outcome.
    Completed,
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `new → running`, `running → paused | stopped | completed`,
    /// `paused → running | stopped`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Running)
                | (Self::Running, Self::Paused)
                | (Self::Running, Self::Stopped)
                | (Self::Running, Self::Completed)
                | (Self::Paused, Self::Running)
                | (Self::Paused, Self::Stopped)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
