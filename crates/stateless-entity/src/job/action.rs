//! Which attachments a job targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stateless_core::error::AppError;

/// Attachment subset selected at job creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobAction {
    /// Every image attachment.
    #[serde(rename = "regenerate_images")]
    RegenerateImages,
    /// Every non-image attachment.
    #[serde(rename = "sync_non_images")]
    SyncNonImages,
    /// Images followed by everything else.
    #[serde(rename = "")]
    All,
}

impl JobAction {
    /// Return the action as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegenerateImages => "regenerate_images",
            Self::SyncNonImages => "sync_non_images",
            Self::All => "",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "regenerate_images" => Ok(Self::RegenerateImages),
            "sync_non_images" => Ok(Self::SyncNonImages),
            "" => Ok(Self::All),
            other => Err(AppError::validation(format!(
                "Unrecognized action: '{other}'."
            ))),
        }
    }
}

impl TryFrom<String> for JobAction {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
