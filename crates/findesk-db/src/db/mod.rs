//! Database repositories for data access layer
//!
//! Repositories are responsible for a specific domain entity and provide
//! CRUD operations and specialized queries. Cross-entity write rules
//! (one financial shape per workflow file) live in `record_link`.

pub mod company;
pub mod company_document;
pub mod completion_run;
pub mod financial_transaction;
pub mod folder;
pub mod loan;
pub mod loan_draft;
pub mod record_link;
pub mod settings;
pub mod storage_location;
pub mod workflow_file;

pub use company::{BankAccountRepository, CompanyRepository};
pub use company_document::CompanyDocumentRepository;
pub use completion_run::CompletionRunRepository;
pub use financial_transaction::TransactionRepository;
pub use folder::FolderRepository;
pub use loan::LoanRepository;
pub use loan_draft::LoanDraftRepository;
pub use record_link::RecordLinkRepository;
pub use settings::SettingsRepository;
pub use storage_location::StorageLocationRepository;
pub use workflow_file::WorkflowFileRepository;
