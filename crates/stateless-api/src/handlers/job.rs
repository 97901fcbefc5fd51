//! Job listing, detail, creation and lifecycle handlers.

use axum::Json;
use axum::extract::State;
use bytes::Bytes;
use tracing::info;
use validator::Validate;

use stateless_core::error::AppError;
use stateless_core::types::StepResult;

use crate::dto::request::CreateJobRequest;
use crate::dto::response::{CreateJobResponse, JobResponse, JobsResponse};
use crate::error::ApiResult;
use crate::extractors::{JobId, JobStepPath};
use crate::state::AppState;

/// GET /jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<JobsResponse>> {
    let jobs = state.jobs.list_incomplete().await?;
    Ok(Json(JobsResponse {
        ok: true,
        message: "Job endpoint up.".to_string(),
        jobs,
    }))
}

/// GET /job/{id}
pub async fn get_job(
    State(state): State<AppState>,
    JobId(id): JobId,
) -> ApiResult<Json<JobResponse>> {
    let detail = state.jobs.detail(id).await?;
    Ok(Json(JobResponse {
        ok: true,
        message: format!("Job {id} found."),
        response: detail,
    }))
}

/// GET /job/{id}/{step} and GET /job/{id}/step/{step}
pub async fn job_step(State(state): State<AppState>, path: JobStepPath) -> Json<StepResult> {
    Json(state.jobs.step(path.id, &path.step).await)
}

/// POST /job/create
///
/// Accepts an empty body or a JSON [`CreateJobRequest`].
pub async fn create_job(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CreateJobResponse>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateJobRequest::default()
    } else {
        serde_json::from_slice::<CreateJobRequest>(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;

    let job = state
        .jobs
        .create(&request.action, request.bulk_size)
        .await?;
    info!(job_id = job.id, autostart = request.autostart, "Job created via API");

    if !request.autostart {
        return Ok(Json(CreateJobResponse {
            ok: true,
            message: format!("Job {} created.", job.id),
            job: state.jobs.detail(job.id).await?,
            response: None,
        }));
    }

    let started = state.jobs.step(job.id, "start").await;
    Ok(Json(CreateJobResponse {
        ok: started.ok,
        message: started.message,
        job: state.jobs.detail(job.id).await?,
        response: started.response,
    }))
}
