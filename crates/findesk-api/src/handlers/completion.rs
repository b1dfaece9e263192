//! Completion endpoints: archive a file, the explicit without-record path,
//! and recovery of stalled runs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use findesk_services::CompletionOutcome;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/complete",
    tag = "completion",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "Completed, or a decision is required", body = CompletionOutcome),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Missing storage location or concurrent completion", body = ErrorResponse)
    )
)]
pub async fn complete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletionOutcome>, HttpAppError> {
    let outcome = state.services.engine.complete(id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/complete-without-record",
    tag = "completion",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "Completed without a financial record", body = CompletionOutcome),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Missing storage location or concurrent completion", body = ErrorResponse)
    )
)]
pub async fn complete_without_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletionOutcome>, HttpAppError> {
    let outcome = state.services.engine.complete_without_record(id).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct RecoverQuery {
    /// Only recover runs that have been running longer than this.
    #[serde(default = "default_older_than_minutes")]
    pub older_than_minutes: i64,
}

fn default_older_than_minutes() -> i64 {
    30
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecoverResponse {
    pub recovered: usize,
}

#[utoipa::path(
    post,
    path = "/api/v0/completion/recover",
    tag = "completion",
    params(
        ("older_than_minutes" = Option<i64>, Query, description = "Minimum age of stalled runs, default 30")
    ),
    responses(
        (status = 200, description = "Stalled completion runs compensated", body = RecoverResponse)
    )
)]
pub async fn recover_stalled(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecoverQuery>,
) -> Result<Json<RecoverResponse>, HttpAppError> {
    let cutoff = Utc::now() - Duration::minutes(query.older_than_minutes.max(0));
    let recovered = state.services.engine.recover_stalled(cutoff).await?;
    Ok(Json(RecoverResponse { recovered }))
}
