//! Completion engine: the saga that moves a workflow file from the inbox
//! into one or two companies' permanent document stores.
//!
//! Ordering is strict: claim the file, resolve every storage location before
//! any byte moves, register a queued loan, copy, insert document records,
//! and only then delete the transient copy. Side effects are recorded in a
//! durable run log and compensated when a later step fails, so a failed run
//! leaves the inbox file intact and no partial archive copies behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use findesk_core::models::{
    CompanyDocument, CompletionReport, CompletionRun, CompletionRunStatus, CompletionStep,
    FinancialRecord, FinancialTransaction, Loan, LoanDraft, NewCompanyDocument, StorageLocation,
    WorkflowFile, STATUS_PENDING,
};
use findesk_core::{validation, AppError};
use findesk_db::{
    BankAccountRepository, CompanyDocumentRepository, CompanyRepository, CompletionRunRepository,
    LoanDraftRepository, LoanRepository, SettingsRepository, StorageLocationRepository,
    WorkflowFileRepository,
};
use findesk_storage::{archive_key, Storage, StorageError};

use super::plan::{self, DecisionReason, Destination};
use crate::matcher::RecordMatcher;

/// The three outcomes offered at the decision checkpoint, in the order the
/// UI presents them.
pub const DECISION_OPTIONS: [&str; 3] = ["complete_without_record", "register_payment", "cancel"];

/// Returned when completion stops at the interactive checkpoint instead of
/// moving the file.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecisionPrompt {
    pub file_id: Uuid,
    pub reason: DecisionReason,
    /// The choices the caller may come back with.
    pub options: Vec<String>,
}

/// Result of a completion attempt.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed(CompletionReport),
    DecisionRequired(DecisionPrompt),
}

/// How the file's bytes and records move, derived from the queued draft or
/// the matched financial record.
enum Flow {
    Draft(LoanDraft),
    Transaction(FinancialTransaction),
    RegisteredLoan(Loan),
    Document(CompanyDocument),
    WithoutRecord,
}

#[derive(Clone)]
pub struct CompletionEngine {
    files: WorkflowFileRepository,
    drafts: LoanDraftRepository,
    loans: LoanRepository,
    documents: CompanyDocumentRepository,
    locations: StorageLocationRepository,
    companies: CompanyRepository,
    bank_accounts: BankAccountRepository,
    settings: SettingsRepository,
    runs: CompletionRunRepository,
    matcher: RecordMatcher,
    storage: Arc<dyn Storage>,
}

impl CompletionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        files: WorkflowFileRepository,
        drafts: LoanDraftRepository,
        loans: LoanRepository,
        documents: CompanyDocumentRepository,
        locations: StorageLocationRepository,
        companies: CompanyRepository,
        bank_accounts: BankAccountRepository,
        settings: SettingsRepository,
        runs: CompletionRunRepository,
        matcher: RecordMatcher,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            files,
            drafts,
            loans,
            documents,
            locations,
            companies,
            bank_accounts,
            settings,
            runs,
            matcher,
            storage,
        }
    }

    /// Complete a workflow file. Stops at the decision checkpoint when the
    /// file has no financial record or a zero-amount transaction.
    pub async fn complete(&self, file_id: Uuid) -> Result<CompletionOutcome, AppError> {
        self.run(file_id, false).await
    }

    /// Complete a workflow file the caller explicitly chose to archive
    /// without a financial record (checkpoint outcome `complete_without_record`).
    pub async fn complete_without_record(
        &self,
        file_id: Uuid,
    ) -> Result<CompletionOutcome, AppError> {
        self.run(file_id, true).await
    }

    #[tracing::instrument(skip(self), fields(file_id = %file_id, without_record = allow_without_record))]
    async fn run(
        &self,
        file_id: Uuid,
        allow_without_record: bool,
    ) -> Result<CompletionOutcome, AppError> {
        if self.files.get(file_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Workflow file {} not found",
                file_id
            )));
        }

        // Compare-and-claim: a second concurrent completion observes the
        // claim and fails here instead of double-copying.
        let file = self.files.claim_for_completion(file_id).await?.ok_or_else(|| {
            AppError::CompletionConflict(format!(
                "File {} is already being completed or was already completed",
                file_id
            ))
        })?;
        let previous_status = file.status.clone();

        match self.execute(&file, allow_without_record).await {
            Ok(CompletionOutcome::Completed(report)) => {
                tracing::info!(
                    file_id = %file_id,
                    run_id = %report.run_id,
                    documents = report.document_ids.len(),
                    loan_id = ?report.loan_id,
                    "Workflow file completed"
                );
                Ok(CompletionOutcome::Completed(report))
            }
            Ok(outcome) => {
                // Checkpoint reached: nothing moved, release the claim.
                self.files.release_claim(file_id, &previous_status).await?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(release_err) = self.files.release_claim(file_id, &previous_status).await
                {
                    tracing::error!(
                        error = %release_err,
                        file_id = %file_id,
                        "Failed to release completion claim after error"
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        file: &WorkflowFile,
        allow_without_record: bool,
    ) -> Result<CompletionOutcome, AppError> {
        // A queued loan draft takes precedence over the matched record;
        // the record linker guarantees they cannot coexist.
        let draft = self.drafts.get_drafted(file.id).await?;
        let record = match draft {
            Some(_) => None,
            None => self.matcher.resolve(file).await?,
        };

        if let Some(reason) = plan::required_decision(record.as_ref(), draft.as_ref()) {
            if !allow_without_record {
                return Ok(CompletionOutcome::DecisionRequired(DecisionPrompt {
                    file_id: file.id,
                    reason,
                    options: DECISION_OPTIONS.iter().map(|s| s.to_string()).collect(),
                }));
            }
        }

        let flow = match (draft, record) {
            (Some(draft), _) => Flow::Draft(draft),
            (None, Some(FinancialRecord::Transaction(tx))) if !tx.is_zero_amount() => {
                Flow::Transaction(tx)
            }
            (None, Some(FinancialRecord::Loan(loan))) => Flow::RegisteredLoan(loan),
            (None, Some(FinancialRecord::Document(doc))) => Flow::Document(doc),
            // No record, or a zero-amount transaction the caller chose to
            // complete past: archive under the default company.
            (None, _) => Flow::WithoutRecord,
        };

        let (destinations, without_record) = self.resolve_destinations(file, &flow).await?;

        let run = self.runs.create(file.id).await?;
        match self.perform(file, &flow, &destinations, run.id).await {
            Ok((document_ids, loan_id)) => {
                self.runs
                    .finish(run.id, CompletionRunStatus::Completed, None)
                    .await?;
                Ok(CompletionOutcome::Completed(CompletionReport {
                    file_id: file.id,
                    run_id: run.id,
                    document_ids,
                    loan_id,
                    without_record,
                }))
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    file_id = %file.id,
                    run_id = %run.id,
                    "Completion run failed; compensating recorded steps"
                );
                let status = match self.runs.get(run.id).await {
                    Ok(Some(logged)) => {
                        if self.compensate(&logged).await {
                            CompletionRunStatus::Compensated
                        } else {
                            CompletionRunStatus::Failed
                        }
                    }
                    _ => CompletionRunStatus::Failed,
                };
                if let Err(finish_err) = self
                    .runs
                    .finish(run.id, status, Some(&err.to_string()))
                    .await
                {
                    tracing::error!(
                        error = %finish_err,
                        run_id = %run.id,
                        "Failed to close completion run log"
                    );
                }
                Err(err)
            }
        }
    }

    /// Steps A-D: reference date, target companies, and storage locations.
    /// Every location is resolved before any byte moves, so a missing
    /// configuration aborts with no side effects.
    async fn resolve_destinations(
        &self,
        file: &WorkflowFile,
        flow: &Flow,
    ) -> Result<(Vec<(Destination, StorageLocation)>, bool), AppError> {
        let mut without_record = false;
        let (date, destinations) = match flow {
            Flow::Draft(draft) => (
                draft.start_date,
                plan::loan_destinations(draft.lending_company_id, draft.borrowing_company_id),
            ),
            Flow::Transaction(tx) => {
                let payer_company = match tx.bank_account_id {
                    Some(account_id) => self
                        .bank_accounts
                        .get(account_id)
                        .await?
                        .map(|account| account.company_id),
                    None => None,
                };
                (
                    plan::reference_date(file, Some(tx)),
                    plan::transaction_destinations(file, tx, payer_company),
                )
            }
            Flow::RegisteredLoan(loan) => (
                loan.start_date,
                plan::loan_destinations(loan.lending_company_id, loan.borrowing_company_id),
            ),
            Flow::Document(doc) => (
                plan::reference_date(file, None),
                vec![Destination {
                    company_id: doc.company_id,
                    document_type: file.category.clone(),
                }],
            ),
            Flow::WithoutRecord => {
                without_record = true;
                let settings = self.settings.get().await?;
                let default_company = settings.default_company_id.ok_or_else(|| {
                    AppError::BadRequest(
                        "No default company configured; cannot complete without a financial record"
                            .to_string(),
                    )
                })?;
                (
                    plan::reference_date(file, None),
                    plan::fallback_destination(file, default_company),
                )
            }
        };

        let (year, month) = plan::year_month(date);
        let mut resolved = Vec::with_capacity(destinations.len());
        for destination in destinations {
            match self
                .locations
                .find(destination.company_id, year, month)
                .await?
            {
                Some(location) => resolved.push((destination, location)),
                None => {
                    let company = self.companies.display_name(destination.company_id).await?;
                    return Err(AppError::MissingStorageLocation {
                        company,
                        year,
                        month,
                    });
                }
            }
        }
        Ok((resolved, without_record))
    }

    /// Steps E-G: register a queued loan, copy the bytes to each destination,
    /// insert the permanent document rows, then delete the transient copy.
    async fn perform(
        &self,
        file: &WorkflowFile,
        flow: &Flow,
        destinations: &[(Destination, StorageLocation)],
        run_id: Uuid,
    ) -> Result<(Vec<Uuid>, Option<Uuid>), AppError> {
        let timestamp = Utc::now().timestamp_millis();
        let sanitized = validation::sanitize_file_name(&file.file_name)?;

        let mut loan_id = None;
        if let Flow::Draft(draft) = flow {
            let loan = self.loans.register_from_draft(draft).await?;
            self.runs
                .append_step(run_id, &CompletionStep::LoanRegistered { loan_id: loan.id })
                .await?;
            self.drafts.mark_registered(file.id).await?;
            loan_id = Some(loan.id);
        }

        let bytes = self
            .storage
            .download(&file.file_key)
            .await
            .map_err(storage_error)?;
        let content_type = file.mime_type.as_deref().unwrap_or("application/octet-stream");

        let mut document_ids = Vec::with_capacity(destinations.len());
        for (destination, location) in destinations {
            let key = archive_key(
                destination.company_id,
                &location.archive_folder_path(),
                timestamp,
                &sanitized,
            );
            let url = self
                .storage
                .upload(&key, content_type, bytes.clone())
                .await
                .map_err(storage_error)?;
            self.runs
                .append_step(
                    run_id,
                    &CompletionStep::CopyUploaded {
                        company_id: destination.company_id,
                        file_key: key.clone(),
                    },
                )
                .await?;

            let document = self
                .documents
                .insert(&NewCompanyDocument {
                    company_id: destination.company_id,
                    folder_id: location.folder_id,
                    name: file.file_name.clone(),
                    file_key: key,
                    file_url: url,
                    file_size: file.file_size,
                    mime_type: file.mime_type.clone(),
                    document_type: destination.document_type.clone(),
                })
                .await?;
            self.runs
                .append_step(
                    run_id,
                    &CompletionStep::DocumentInserted {
                        company_id: destination.company_id,
                        document_id: document.id,
                    },
                )
                .await?;
            document_ids.push(document.id);
        }

        // Step G is the only irreversible step; it runs only after every
        // permanent copy above succeeded.
        self.storage
            .delete(&file.file_key)
            .await
            .map_err(storage_error)?;
        self.files.delete_claimed(file.id).await?;

        Ok((document_ids, loan_id))
    }

    /// Undo the recorded side effects of a failed run, newest first.
    /// Best-effort: every compensation is attempted; returns whether all of
    /// them succeeded.
    async fn compensate(&self, run: &CompletionRun) -> bool {
        let mut all_ok = true;
        for step in run.decoded_steps().iter().rev() {
            match step {
                CompletionStep::CopyUploaded { file_key, .. } => {
                    if let Err(err) = self.storage.delete(file_key).await {
                        tracing::error!(
                            error = %err,
                            key = %file_key,
                            run_id = %run.id,
                            "Failed to delete archive copy during compensation"
                        );
                        all_ok = false;
                    }
                }
                CompletionStep::DocumentInserted { document_id, .. } => {
                    if let Err(err) = self.documents.delete(*document_id).await {
                        tracing::error!(
                            error = %err,
                            document_id = %document_id,
                            run_id = %run.id,
                            "Failed to delete document record during compensation"
                        );
                        all_ok = false;
                    }
                }
                CompletionStep::LoanRegistered { loan_id } => {
                    if let Err(err) = self.loans.delete(*loan_id).await {
                        tracing::error!(
                            error = %err,
                            loan_id = %loan_id,
                            run_id = %run.id,
                            "Failed to delete registered loan during compensation"
                        );
                        all_ok = false;
                    }
                    if let Err(err) = self.drafts.reopen(run.file_id).await {
                        tracing::error!(
                            error = %err,
                            file_id = %run.file_id,
                            run_id = %run.id,
                            "Failed to reopen loan draft during compensation"
                        );
                        all_ok = false;
                    }
                }
            }
        }
        all_ok
    }

    /// Compensate runs a crashed process left `running`. Call at startup or
    /// from an operator endpoint; returns how many runs were recovered.
    #[tracing::instrument(skip(self))]
    pub async fn recover_stalled(&self, older_than: DateTime<Utc>) -> Result<usize, AppError> {
        let stalled = self.runs.list_stalled(older_than).await?;
        let count = stalled.len();
        for run in stalled {
            tracing::warn!(
                run_id = %run.id,
                file_id = %run.file_id,
                started_at = %run.started_at,
                "Recovering stalled completion run"
            );
            let status = if self.compensate(&run).await {
                CompletionRunStatus::Compensated
            } else {
                CompletionRunStatus::Failed
            };
            self.runs
                .finish(run.id, status, Some("recovered stalled completion run"))
                .await?;
            self.files
                .release_claim(run.file_id, STATUS_PENDING)
                .await?;
        }
        Ok(count)
    }
}

fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
        other => AppError::Storage(other.to_string()),
    }
}
