//! Remote job-handler service configuration.

use serde::{Deserialize, Serialize};

/// Where job lifecycle signals are delivered and how hard to try.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandlerConfig {
    /// Base URL of the job-handler service (with trailing slash).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Total attempts for a retryable delivery failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff between attempts in milliseconds (doubled per attempt).
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for JobHandlerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_backoff(),
        }
    }
}

fn default_endpoint() -> String {
    "http://api.usabilitydynamics.com/product/stateless/v1/".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    250
}
