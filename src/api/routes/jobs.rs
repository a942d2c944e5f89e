//! Job handlers: paged listing, summaries, reruns and component commands.

use crate::api::AppState;
use crate::db::Job;
use crate::error::Result;
use crate::types::{
    ComponentCommand, ComponentQuery, EnrichedJob, JobKey, Page, PagedJobQuery, ReRunRequest,
    RerunOutcome,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

/// POST /job/query/page - Paged job list with dataset views
#[utoipa::path(
    post,
    path = "/job/query/page",
    tag = "jobs",
    request_body = PagedJobQuery,
    responses(
        (status = 200, description = "One page of jobs, newest first", body = crate::types::JobPage),
        (status = 400, description = "A filter failed validation", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn query_jobs_page(
    State(state): State<AppState>,
    Json(query): Json<PagedJobQuery>,
) -> Result<Json<Page<EnrichedJob>>> {
    let page = state.board.query_jobs_page(&query).await?;
    Ok(Json(page))
}

/// GET /job/query/:job_id/:role/:party_id - Job summary
#[utoipa::path(
    get,
    path = "/job/query/{job_id}/{role}/{party_id}",
    tag = "jobs",
    params(
        ("job_id" = String, Path, description = "Job identifier"),
        ("role" = String, Path, description = "Role of the viewing party"),
        ("party_id" = String, Path, description = "Viewing party identifier")
    ),
    responses(
        (status = 200, description = "Stored job and its dataset view as `{ job, dataset }`"),
        (status = 400, description = "A path part failed validation", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError),
        (status = 502, description = "Flow service failed", body = crate::error::ApiError)
    )
)]
pub async fn job_summary(
    State(state): State<AppState>,
    Path((job_id, role, party_id)): Path<(String, String, String)>,
) -> Result<Json<Value>> {
    let key = JobKey::new(job_id, role, party_id);
    let summary = state.board.job_summary(&key).await?;
    Ok(Json(summary))
}

/// GET /job/query/status - Jobs still waiting or running
#[utoipa::path(
    get,
    path = "/job/query/status",
    tag = "jobs",
    responses(
        (status = 200, description = "Unfinished jobs, newest first, without payload fields", body = [Job]),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn job_status(State(state): State<AppState>) -> Result<Json<Vec<Job>>> {
    let jobs = state.board.query_job_status().await?;
    Ok(Json(jobs))
}

/// POST /job/rerun - Rerun a job from a component
#[utoipa::path(
    post,
    path = "/job/rerun",
    tag = "jobs",
    request_body = ReRunRequest,
    responses(
        (status = 200, description = "code 0 when the flow service accepted the rerun, 1 otherwise", body = RerunOutcome),
        (status = 400, description = "job_id or component_name failed validation", body = crate::error::ApiError)
    )
)]
pub async fn rerun_job(
    State(state): State<AppState>,
    Json(request): Json<ReRunRequest>,
) -> Result<Json<RerunOutcome>> {
    let outcome = state.board.rerun(request).await?;
    Ok(Json(outcome))
}

/// POST /job/component/command - Flow CLI command exporting a component's output
#[utoipa::path(
    post,
    path = "/job/component/command",
    tag = "jobs",
    request_body = ComponentQuery,
    responses(
        (status = 200, description = "Command line to run", body = ComponentCommand),
        (status = 400, description = "A field failed validation", body = crate::error::ApiError)
    )
)]
pub async fn component_command(
    State(state): State<AppState>,
    Json(query): Json<ComponentQuery>,
) -> Result<Json<ComponentCommand>> {
    let command = state.board.component_output_command(&query)?;
    Ok(Json(command))
}
