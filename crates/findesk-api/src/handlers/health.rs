//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service healthy", body = HealthResponse))
)]
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, HttpAppError> {
    // A trivial query proves the database connection is alive.
    sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .map_err(findesk_core::AppError::from)?;
    Ok(Json(HealthResponse { status: "ok" }))
}
