//! Company, bank account, and folder management endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use findesk_core::models::{
    BankAccount, Company, CompanyFolder, CreateBankAccountRequest, CreateCompanyRequest,
    CreateFolderRequest,
};
use findesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;

#[utoipa::path(
    get,
    path = "/api/v0/companies",
    tag = "companies",
    responses((status = 200, description = "All companies", body = [Company]))
)]
pub async fn list_companies(
    State(db): State<DbState>,
) -> Result<Json<Vec<Company>>, HttpAppError> {
    let companies = db.companies.list().await?;
    Ok(Json(companies))
}

#[utoipa::path(
    post,
    path = "/api/v0/companies",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 200, description = "Company created", body = Company),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_company(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<CreateCompanyRequest>,
) -> Result<Json<Company>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let company = db
        .companies
        .create(&request.name, request.tax_id.as_deref())
        .await?;
    Ok(Json(company))
}

#[utoipa::path(
    get,
    path = "/api/v0/bank-accounts",
    tag = "companies",
    responses((status = 200, description = "Active bank accounts", body = [BankAccount]))
)]
pub async fn list_bank_accounts(
    State(db): State<DbState>,
) -> Result<Json<Vec<BankAccount>>, HttpAppError> {
    let accounts = db.bank_accounts.list_active().await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    post,
    path = "/api/v0/bank-accounts",
    tag = "companies",
    request_body = CreateBankAccountRequest,
    responses(
        (status = 200, description = "Bank account created", body = BankAccount),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_bank_account(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<CreateBankAccountRequest>,
) -> Result<Json<BankAccount>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    if db.companies.get(request.company_id).await?.is_none() {
        return Err(
            AppError::NotFound(format!("Company {} not found", request.company_id)).into(),
        );
    }
    let account = db
        .bank_accounts
        .create(
            request.company_id,
            &request.account_name,
            request.account_type,
        )
        .await?;
    Ok(Json(account))
}

#[utoipa::path(
    get,
    path = "/api/v0/companies/{id}/folders",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses((status = 200, description = "The company's folders", body = [CompanyFolder]))
)]
pub async fn list_folders(
    State(db): State<DbState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CompanyFolder>>, HttpAppError> {
    let folders = db.folders.list_by_company(id).await?;
    Ok(Json(folders))
}

#[utoipa::path(
    post,
    path = "/api/v0/folders",
    tag = "companies",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created", body = CompanyFolder),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_folder(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<CreateFolderRequest>,
) -> Result<Json<CompanyFolder>, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    if db.companies.get(request.company_id).await?.is_none() {
        return Err(
            AppError::NotFound(format!("Company {} not found", request.company_id)).into(),
        );
    }
    let folder = db
        .folders
        .create(request.company_id, &request.name, request.parent_folder_id)
        .await?;
    Ok(Json(folder))
}
