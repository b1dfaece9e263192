//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only
//! what they need via Axum's `FromRef`.

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

// ----- Sub-state types -----

/// Database pool and repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub files: WorkflowFileRepository,
    pub transactions: TransactionRepository,
    pub loans: LoanRepository,
    pub drafts: LoanDraftRepository,
    pub documents: CompanyDocumentRepository,
    pub folders: FolderRepository,
    pub companies: CompanyRepository,
    pub bank_accounts: BankAccountRepository,
    pub locations: StorageLocationRepository,
    pub settings: SettingsRepository,
    pub runs: CompletionRunRepository,
    pub links: RecordLinkRepository,
}

/// Reconciliation services built over the repositories.
#[derive(Clone)]
pub struct ServiceState {
    pub matcher: RecordMatcher,
    pub engine: CompletionEngine,
    pub lifecycle: Arc<FileLifecycleService>,
}

/// Upload limits and allowlists for workflow files.
#[derive(Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub services: ServiceState,
    pub uploads: UploadConfig,
    pub storage: Arc<dyn Storage>,
    pub config: Config,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for ServiceState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.services.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for UploadConfig {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.uploads.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
