//! OpenAPI documentation assembled from handler annotations.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::completion::RecoverResponse;
use crate::handlers::health::HealthResponse;
use crate::handlers::records::{AttachDocumentRequest, ResolveResponse};
use findesk_core::models::{
    BankAccount, Company, CompanyDocument, CompanyFolder, CompletionReport,
    CreateBankAccountRequest, CreateCompanyRequest, CreateFolderRequest, CreateTransactionRequest,
    FinancialRecord, FinancialTransaction, Loan, LoanDraft, SaveLoanDraftRequest, StorageLocation,
    UpdateSettingsRequest, UpdateWorkflowFileRequest, UpsertStorageLocationRequest,
    WorkflowFileResponse, WorkflowSettings,
};
use findesk_services::{CompletionOutcome, DecisionPrompt};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "findesk API",
        description = "Back-office financial-document workflow: inbox triage, \
                       record matching, and completion into company archives."
    ),
    paths(
        handlers::health::health,
        handlers::workflow_files::upload_file,
        handlers::workflow_files::list_files,
        handlers::workflow_files::get_file,
        handlers::workflow_files::update_file,
        handlers::workflow_files::delete_file,
        handlers::workflow_files::download_file,
        handlers::records::get_record,
        handlers::records::create_transaction,
        handlers::records::attach_document,
        handlers::records::save_loan_draft,
        handlers::records::get_loan_draft,
        handlers::completion::complete_file,
        handlers::completion::complete_without_record,
        handlers::completion::recover_stalled,
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::list_bank_accounts,
        handlers::companies::create_bank_account,
        handlers::companies::list_folders,
        handlers::companies::create_folder,
        handlers::storage_locations::list_storage_locations,
        handlers::storage_locations::upsert_storage_location,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(schemas(
        ErrorResponse,
        HealthResponse,
        RecoverResponse,
        ResolveResponse,
        AttachDocumentRequest,
        BankAccount,
        Company,
        CompanyDocument,
        CompanyFolder,
        CompletionOutcome,
        CompletionReport,
        CreateBankAccountRequest,
        CreateCompanyRequest,
        CreateFolderRequest,
        CreateTransactionRequest,
        DecisionPrompt,
        FinancialRecord,
        FinancialTransaction,
        Loan,
        LoanDraft,
        SaveLoanDraftRequest,
        StorageLocation,
        UpdateSettingsRequest,
        UpdateWorkflowFileRequest,
        UpsertStorageLocationRequest,
        WorkflowFileResponse,
        WorkflowSettings,
    )),
    tags(
        (name = "files", description = "Workflow file inbox"),
        (name = "records", description = "Financial record linking"),
        (name = "completion", description = "Archiving files into company stores"),
        (name = "companies", description = "Companies, bank accounts, folders"),
        (name = "storage-locations", description = "Monthly archive configuration"),
        (name = "settings", description = "Workflow settings"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
