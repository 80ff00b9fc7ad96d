//! Job API Handlers
//!
//! HTTP endpoints for job submission and status polling.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use harvest_core::domain::job::JobRecord;
use harvest_core::domain::request::JobRequest;
use harvest_core::dto::job::{JobList, SubmitJobResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::ValidatedRequest;

/// POST /jobs
/// Validate and admit a collection job
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitJobResponse>> {
    let Json(req) = payload?;
    tracing::info!("Submitting {} job for backend {}", req.mode, req.backend);

    let request = ValidatedRequest::new(req).map_err(|e| {
        tracing::debug!("Rejected job request: {}", e);
        ApiError::BadRequest(e.reason)
    })?;

    let record = state.orchestrator.submit(request)?;

    Ok(Json(SubmitJobResponse::from(&record)))
}

/// GET /jobs/{id}
/// Get job status by ID
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    tracing::debug!("Getting job: {}", id);

    let record = state.orchestrator.status(&id)?;

    Ok(Json(record))
}

/// GET /jobs
/// List all retained jobs
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobList> {
    tracing::debug!("Listing all jobs");

    Json(JobList::from(state.orchestrator.list()))
}

/// POST /jobs/{id}/cancel
/// Request cancellation of a pending or running job
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<JobRecord>)> {
    tracing::info!("Cancelling job: {}", id);

    let record = state.orchestrator.cancel(&id)?;

    Ok((StatusCode::ACCEPTED, Json(record)))
}
