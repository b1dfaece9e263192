//! Findesk Database Library
//!
//! Repository implementations for the data access layer. Each repository owns
//! a specific domain entity and provides CRUD operations and specialized
//! queries over the shared `PgPool`.

pub mod db;

pub use db::{
    BankAccountRepository, CompanyDocumentRepository, CompanyRepository, CompletionRunRepository,
    FolderRepository, LoanDraftRepository, LoanRepository, RecordLinkRepository,
    SettingsRepository, StorageLocationRepository, TransactionRepository, WorkflowFileRepository,
};
