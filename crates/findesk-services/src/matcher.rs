//! Record matcher: which financial record (if any) is linked to a file.
//!
//! Lookup order is a priority, not a constraint: the back-reference link is
//! authoritative, the URL matches are fallbacks for rows written before the
//! back-reference existed. If several shapes reference the same file, only
//! the first found in this order is surfaced; the record linker prevents new
//! data from getting into that state.

use findesk_core::models::{FinancialRecord, FinancialTransaction, WorkflowFile};
use findesk_core::AppError;
use findesk_db::{CompanyDocumentRepository, LoanRepository, TransactionRepository};

#[derive(Clone)]
pub struct RecordMatcher {
    transactions: TransactionRepository,
    loans: LoanRepository,
    documents: CompanyDocumentRepository,
}

impl RecordMatcher {
    pub fn new(
        transactions: TransactionRepository,
        loans: LoanRepository,
        documents: CompanyDocumentRepository,
    ) -> Self {
        Self {
            transactions,
            loans,
            documents,
        }
    }

    /// Resolve the financial record linked to a workflow file.
    ///
    /// 1. Transaction by back-reference (authoritative).
    /// 2. Transaction by stored invoice URL, most recent first; an empty
    ///    back-reference is repaired as a side effect.
    /// 3. Loan by source-file reference.
    /// 4. Company document by stored URL, most recent first.
    ///
    /// Any lookup failure aborts the whole resolution; no partial results.
    #[tracing::instrument(skip(self, file), fields(file_id = %file.id))]
    pub async fn resolve(&self, file: &WorkflowFile) -> Result<Option<FinancialRecord>, AppError> {
        if let Some(transaction) = self.transactions.get_by_source_file(file.id).await? {
            tracing::debug!(transaction_id = %transaction.id, "Matched transaction by back-reference");
            return Ok(Some(FinancialRecord::Transaction(transaction)));
        }

        if let Some(transaction) = self.transactions.latest_by_file_url(&file.file_url).await? {
            let transaction = self.repair_link(transaction, file).await?;
            tracing::debug!(transaction_id = %transaction.id, "Matched transaction by file URL");
            return Ok(Some(FinancialRecord::Transaction(transaction)));
        }

        if let Some(loan) = self.loans.get_by_source_file(file.id).await? {
            tracing::debug!(loan_id = %loan.id, "Matched loan by source file");
            return Ok(Some(FinancialRecord::Loan(loan)));
        }

        if let Some(document) = self.documents.latest_by_url(&file.file_url).await? {
            tracing::debug!(document_id = %document.id, "Matched document by file URL");
            return Ok(Some(FinancialRecord::Document(document)));
        }

        Ok(None)
    }

    /// Write the back-reference when a URL-matched transaction lacks one.
    /// The repair is best-effort in intent but its failure still aborts the
    /// resolution — the caller must not observe a half-linked record.
    async fn repair_link(
        &self,
        transaction: FinancialTransaction,
        file: &WorkflowFile,
    ) -> Result<FinancialTransaction, AppError> {
        if transaction.source_file_id.is_some() {
            return Ok(transaction);
        }

        tracing::info!(
            transaction_id = %transaction.id,
            file_id = %file.id,
            "Repairing missing source-file link on URL-matched transaction"
        );
        self.transactions
            .link_source_file(transaction.id, file.id)
            .await?;

        Ok(FinancialTransaction {
            source_file_id: Some(file.id),
            ..transaction
        })
    }
}
