//! Workflow file triage: upload, list, update, download, delete.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use findesk_core::models::{UpdateWorkflowFileRequest, WorkflowFileResponse};
use findesk_core::{validation, AppError};
use findesk_storage::inbox_key;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::{AppState, DbState, ServiceState};
use crate::utils::upload::extract_multipart_file;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/files",
    tag = "files",
    params(
        ("category" = Option<String>, Query, description = "Category tag pre-set on the uploaded file")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded into the inbox", body = WorkflowFileResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<WorkflowFileResponse>, HttpAppError> {
    let (data, original_filename, content_type) = extract_multipart_file(multipart).await?;

    validation::validate_file_size(data.len(), state.uploads.max_file_size)?;
    validation::validate_content_type(&content_type, &state.uploads.allowed_content_types)?;
    validation::validate_file_extension(&original_filename, &state.uploads.allowed_extensions)?;
    let sanitized = validation::sanitize_file_name(&original_filename)?;

    let file_size = data.len() as i64;
    let key = inbox_key(Utc::now().timestamp_millis(), &sanitized);
    let url = state.storage.upload(&key, &content_type, data).await?;

    let file = state
        .db
        .files
        .create(
            &original_filename,
            &key,
            &url,
            Some(file_size),
            Some(&content_type),
            query.category.as_deref(),
        )
        .await?;

    tracing::info!(file_id = %file.id, file_name = %file.file_name, "Workflow file uploaded");
    Ok(Json(WorkflowFileResponse::from(file)))
}

#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    params(
        ("category" = Option<String>, Query, description = "Filter by category tag"),
        ("search" = Option<String>, Query, description = "Case-insensitive search over name and notes")
    ),
    responses(
        (status = 200, description = "Inbox files, newest first", body = [WorkflowFileResponse])
    )
)]
pub async fn list_files(
    State(db): State<DbState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WorkflowFileResponse>>, HttpAppError> {
    let files = db
        .files
        .list(query.category.as_deref(), query.search.as_deref())
        .await?;
    Ok(Json(files.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "Workflow file", body = WorkflowFileResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(db): State<DbState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowFileResponse>, HttpAppError> {
    let file = db
        .files
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workflow file {} not found", id)))?;
    Ok(Json(WorkflowFileResponse::from(file)))
}

#[utoipa::path(
    patch,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    request_body = UpdateWorkflowFileRequest,
    responses(
        (status = 200, description = "Updated workflow file", body = WorkflowFileResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_file(
    State(db): State<DbState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateWorkflowFileRequest>,
) -> Result<Json<WorkflowFileResponse>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let file = db
        .files
        .update(id, &request)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workflow file {} not found", id)))?;
    Ok(Json(WorkflowFileResponse::from(file)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(services): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    let deleted = services.lifecycle.delete_file(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Workflow file {} not found", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/download",
    tag = "files",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "File bytes"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let file = state
        .db
        .files
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workflow file {} not found", id)))?;

    let bytes = state.storage.download(&file.file_key).await?;
    let content_type = file
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream")
        .to_string();
    let disposition = format!("attachment; filename=\"{}\"", file.file_name.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
