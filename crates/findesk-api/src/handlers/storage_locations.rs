//! Storage location administration: the (company, year, month) -> folder
//! mapping the completion engine files under.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use findesk_core::models::{StorageLocation, UpsertStorageLocationRequest};
use findesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;

#[derive(Debug, Deserialize)]
pub struct ListLocationsQuery {
    pub company_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/v0/storage-locations",
    tag = "storage-locations",
    params(("company_id" = Uuid, Query, description = "Company whose locations to list")),
    responses((status = 200, description = "Configured locations, newest month first", body = [StorageLocation]))
)]
pub async fn list_storage_locations(
    State(db): State<DbState>,
    Query(query): Query<ListLocationsQuery>,
) -> Result<Json<Vec<StorageLocation>>, HttpAppError> {
    let locations = db.locations.list_by_company(query.company_id).await?;
    Ok(Json(locations))
}

#[utoipa::path(
    put,
    path = "/api/v0/storage-locations",
    tag = "storage-locations",
    request_body = UpsertStorageLocationRequest,
    responses(
        (status = 200, description = "Location created or updated", body = StorageLocation),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Company or folder not found", body = ErrorResponse)
    )
)]
pub async fn upsert_storage_location(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<UpsertStorageLocationRequest>,
) -> Result<Json<StorageLocation>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    if db.companies.get(request.company_id).await?.is_none() {
        return Err(
            AppError::NotFound(format!("Company {} not found", request.company_id)).into(),
        );
    }

    // When the location points at a folder without an explicit path
    // override, derive the path from the folder tree.
    let folder_path = match (&request.folder_path, request.folder_id) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(folder_id)) => db.folders.path_of(folder_id).await?,
        (None, None) => None,
    };

    let location = db
        .locations
        .upsert(
            request.company_id,
            request.year,
            request.month,
            request.folder_id,
            folder_path.as_deref(),
        )
        .await?;
    Ok(Json(location))
}
