//! Per-attachment processing callback.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{JobProgress, ProcessAttachmentResponse};
use crate::error::ApiResult;
use crate::extractors::{AttachmentId, CallbackQuery};
use crate::state::AppState;

/// GET /process_attachment/{id}
///
/// With a `job` query parameter the callback is checked against that job
/// first, and the outcome is recorded on it afterwards.
pub async fn process_attachment(
    State(state): State<AppState>,
    AttachmentId(id): AttachmentId,
    CallbackQuery(query): CallbackQuery,
) -> ApiResult<Json<ProcessAttachmentResponse>> {
    let Some(job_id) = query.job else {
        let result = state.processor.process(id).await;
        return Ok(Json(ProcessAttachmentResponse {
            ok: result.ok,
            message: result.message,
            job: None,
        }));
    };

    if let Err(e) = state
        .jobs
        .verify_callback(job_id, query.secret.as_deref(), id)
        .await
    {
        warn!(job_id, attachment_id = id, error = %e.message, "Processing callback refused");
        return Err(e.into());
    }

    let result = state.processor.process(id).await;
    let job = state.jobs.record_result(job_id, id, result.ok).await?;

    Ok(Json(ProcessAttachmentResponse {
        ok: result.ok,
        message: result.message,
        job: Some(JobProgress::from(&job)),
    }))
}
