//! HTTP client for the remote job-handler service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tracing::debug;

use stateless_core::config::JobHandlerConfig;
use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::job_handler::{JobHandler, RemoteResponse};

/// [`JobHandler`] speaking to `{endpoint}job/{id}/...`.
#[derive(Debug, Clone)]
pub struct HttpJobHandler {
    http: Client,
    endpoint: Url,
}

impl HttpJobHandler {
    /// Create a client from configuration.
    pub fn new(config: &JobHandlerConfig) -> AppResult<Self> {
        let mut endpoint = config.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid job handler endpoint '{}'", config.endpoint),
                e,
            )
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self { http, endpoint })
    }

    fn job_url(&self, job_id: i64, action: &str) -> AppResult<Url> {
        self.endpoint
            .join(&format!("job/{job_id}/{action}"))
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Invalid job handler URL", e))
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<RemoteResponse> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        debug!(status = status.as_u16(), "Job handler answered");

        if status.is_success() {
            return Ok(RemoteResponse {
                status: status.as_u16(),
                body,
            });
        }

        let message = format!("Job handler answered HTTP {}", status.as_u16());
        if status.is_server_error() || status.as_u16() == 429 {
            Err(AppError::remote_unavailable(message))
        } else {
            Err(AppError::internal(message))
        }
    }
}

#[async_trait]
impl JobHandler for HttpJobHandler {
    async fn start(&self, job_id: i64, job: &serde_json::Value) -> AppResult<RemoteResponse> {
        let url = self.job_url(job_id, "start")?;
        self.send(self.http.post(url).json(job)).await
    }

    async fn signal(&self, job_id: i64, signal: &str) -> AppResult<RemoteResponse> {
        let url = self.job_url(job_id, signal)?;
        self.send(self.http.get(url)).await
    }
}

/// Timeouts and connection failures are retryable.
fn transport_error(e: reqwest::Error) -> AppError {
    let message = if e.is_timeout() {
        "Job handler request timed out".to_string()
    } else {
        format!("Job handler request failed: {e}")
    };
    AppError::with_source(ErrorKind::RemoteUnavailable, message, e)
}
