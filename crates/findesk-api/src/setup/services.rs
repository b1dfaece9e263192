//! Repository and service wiring.

use findesk_core::Config;
use findesk_db::{
    BankAccountRepository, CompanyDocumentRepository, CompanyRepository, CompletionRunRepository,
    FolderRepository, LoanDraftRepository, LoanRepository, RecordLinkRepository,
    SettingsRepository, StorageLocationRepository, TransactionRepository, WorkflowFileRepository,
};
use findesk_services::{CompletionEngine, FileLifecycleService, RecordMatcher};
use findesk_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::{AppState, DbState, ServiceState, UploadConfig};

/// Build all repositories and services into the application state.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let files = WorkflowFileRepository::new(pool.clone());
    let transactions = TransactionRepository::new(pool.clone());
    let loans = LoanRepository::new(pool.clone());
    let drafts = LoanDraftRepository::new(pool.clone());
    let documents = CompanyDocumentRepository::new(pool.clone());
    let folders = FolderRepository::new(pool.clone());
    let companies = CompanyRepository::new(pool.clone());
    let bank_accounts = BankAccountRepository::new(pool.clone());
    let locations = StorageLocationRepository::new(pool.clone());
    let settings = SettingsRepository::new(pool.clone());
    let runs = CompletionRunRepository::new(pool.clone());
    let links = RecordLinkRepository::new(pool.clone());

    let matcher = RecordMatcher::new(transactions.clone(), loans.clone(), documents.clone());
    let engine = CompletionEngine::new(
        files.clone(),
        drafts.clone(),
        loans.clone(),
        documents.clone(),
        locations.clone(),
        companies.clone(),
        bank_accounts.clone(),
        settings.clone(),
        runs.clone(),
        matcher.clone(),
        storage.clone(),
    );
    let lifecycle = Arc::new(FileLifecycleService::new(
        files.clone(),
        drafts.clone(),
        storage.clone(),
    ));

    Arc::new(AppState {
        db: DbState {
            pool,
            files,
            transactions,
            loans,
            drafts,
            documents,
            folders,
            companies,
            bank_accounts,
            locations,
            settings,
            runs,
            links,
        },
        services: ServiceState {
            matcher,
            engine,
            lifecycle,
        },
        uploads: UploadConfig {
            max_file_size: config.max_file_size_bytes(),
            allowed_extensions: config.allowed_extensions().to_vec(),
            allowed_content_types: config.allowed_content_types().to_vec(),
        },
        storage,
        config: config.clone(),
    })
}
