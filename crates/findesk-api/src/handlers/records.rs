//! Financial record linking: the matcher endpoint and the editor panel's
//! save contract (transaction / document / loan draft).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use findesk_core::models::{
    CompanyDocument, CreateTransactionRequest, FinancialRecord, FinancialTransaction, LoanDraft,
    SaveLoanDraftRequest, WorkflowFile,
};
use findesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::{AppState, DbState};

/// The matcher's answer for a file: its linked record, or none.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveResponse {
    pub record: Option<FinancialRecord>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AttachDocumentRequest {
    pub company_id: Uuid,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
}

async fn load_file(db: &DbState, id: Uuid) -> Result<WorkflowFile, AppError> {
    db.files
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workflow file {} not found", id)))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/record",
    tag = "records",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "Linked financial record, if any", body = ResolveResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResolveResponse>, HttpAppError> {
    let file = load_file(&state.db, id).await?;

    // Matching can be switched off entirely in settings; the editor panel
    // then opens blank instead of pre-filled.
    let settings = state.db.settings.get().await?;
    if !settings.link_workflow_to_finance {
        return Ok(Json(ResolveResponse { record: None }));
    }

    let record = state.services.matcher.resolve(&file).await?;
    Ok(Json(ResolveResponse { record }))
}

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/transaction",
    tag = "records",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    request_body = CreateTransactionRequest,
    responses(
        (status = 200, description = "Transaction registered for the file", body = FinancialTransaction),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Another financial shape is already linked", body = ErrorResponse)
    )
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateTransactionRequest>,
) -> Result<Json<FinancialTransaction>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let file = load_file(&state.db, id).await?;

    let (amount_net, vat_amount) = request.vat_breakdown();
    let transaction = state
        .db
        .links
        .attach_transaction(&file, &request, amount_net, vat_amount)
        .await?;

    tracing::info!(
        file_id = %file.id,
        transaction_id = %transaction.id,
        "Transaction registered from workflow file"
    );
    Ok(Json(transaction))
}

#[utoipa::path(
    post,
    path = "/api/v0/files/{id}/document",
    tag = "records",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    request_body = AttachDocumentRequest,
    responses(
        (status = 200, description = "File linked as a company document", body = CompanyDocument),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Another financial shape is already linked", body = ErrorResponse)
    )
)]
pub async fn attach_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AttachDocumentRequest>,
) -> Result<Json<CompanyDocument>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let file = load_file(&state.db, id).await?;

    let document = state
        .db
        .links
        .attach_document(
            &file,
            request.company_id,
            request.folder_id,
            request.name.as_deref(),
        )
        .await?;
    Ok(Json(document))
}

#[utoipa::path(
    put,
    path = "/api/v0/files/{id}/loan-draft",
    tag = "records",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    request_body = SaveLoanDraftRequest,
    responses(
        (status = 200, description = "Loan draft saved", body = LoanDraft),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Another financial shape is already linked", body = ErrorResponse)
    )
)]
pub async fn save_loan_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SaveLoanDraftRequest>,
) -> Result<Json<LoanDraft>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    if request.lending_company_id == request.borrowing_company_id {
        return Err(
            AppError::InvalidInput("Lender and borrower must be different companies".to_string())
                .into(),
        );
    }
    let file = load_file(&state.db, id).await?;

    let draft = state
        .db
        .links
        .save_loan_draft(&file, &request)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Loan draft for file {} was already registered or discarded",
                id
            ))
        })?;

    tracing::info!(file_id = %file.id, "Loan draft saved");
    Ok(Json(draft))
}

#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/loan-draft",
    tag = "records",
    params(("id" = Uuid, Path, description = "Workflow file id")),
    responses(
        (status = 200, description = "Loan draft for the file", body = LoanDraft),
        (status = 404, description = "File or draft not found", body = ErrorResponse)
    )
)]
pub async fn get_loan_draft(
    State(db): State<DbState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanDraft>, HttpAppError> {
    let draft = db
        .drafts
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No loan draft for file {}", id)))?;
    Ok(Json(draft))
}
