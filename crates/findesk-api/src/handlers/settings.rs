//! Workflow settings endpoints.

use axum::{extract::State, Json};

use findesk_core::models::{UpdateSettingsRequest, WorkflowSettings};

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::DbState;

#[utoipa::path(
    get,
    path = "/api/v0/settings",
    tag = "settings",
    responses((status = 200, description = "Workflow settings", body = WorkflowSettings))
)]
pub async fn get_settings(State(db): State<DbState>) -> Result<Json<WorkflowSettings>, HttpAppError> {
    let settings = db.settings.get().await?;
    Ok(Json(settings))
}

#[utoipa::path(
    patch,
    path = "/api/v0/settings",
    tag = "settings",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Updated settings", body = WorkflowSettings))
)]
pub async fn update_settings(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<UpdateSettingsRequest>,
) -> Result<Json<WorkflowSettings>, HttpAppError> {
    let settings = db.settings.update(&request).await?;
    Ok(Json(settings))
}
