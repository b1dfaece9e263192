//! Record linking: attaching a financial shape to a workflow file.
//!
//! A workflow file has at most one financial shape (transaction, loan, or
//! document). That rule is enforced here, at write time, inside a single
//! database transaction: attaching a shape fails with a conflict when a
//! different shape already references the file, and re-attaching the same
//! shape overwrites it (re-edit before completion).

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use findesk_core::models::{
    CompanyDocument, CreateTransactionRequest, FinancialTransaction, LoanDraft, LoanDraftStatus,
    SaveLoanDraftRequest, WorkflowFile,
};
use findesk_core::AppError;

const TX_COLUMNS: &str = "id, company_id, transaction_type, category, date, description, \
     entity_name, total_amount, amount_net, vat_amount, vat_rate, payment_method, \
     invoice_number, notes, project_id, bank_account_id, source_file_id, invoice_file_url, \
     created_at, updated_at";

const DOC_COLUMNS: &str = "id, company_id, folder_id, name, file_key, file_url, file_size, \
     mime_type, document_type, created_at, updated_at";

const DRAFT_COLUMNS: &str = "file_id, status, lending_company_id, borrowing_company_id, \
     amount, interest_rate, monthly_payment, start_date, end_date, description, \
     created_at, updated_at";

/// The shape being attached, for conflict checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Transaction,
    Loan,
    Document,
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Shape::Transaction => "transaction",
            Shape::Loan => "loan",
            Shape::Document => "document",
        }
    }
}

#[derive(Clone)]
pub struct RecordLinkRepository {
    pool: PgPool,
}

impl RecordLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register (or overwrite) the transaction linked to a workflow file.
    #[tracing::instrument(skip(self, file, request), fields(file_id = %file.id))]
    pub async fn attach_transaction(
        &self,
        file: &WorkflowFile,
        request: &CreateTransactionRequest,
        amount_net: Decimal,
        vat_amount: Decimal,
    ) -> Result<FinancialTransaction, AppError> {
        let mut tx = self.pool.begin().await?;

        self.reject_conflicting_shapes(&mut tx, file, Shape::Transaction)
            .await?;

        let now = Utc::now();
        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM financial_transactions
            WHERE source_file_id = $1 OR invoice_file_url = $2
            ORDER BY (source_file_id = $1) DESC NULLS LAST, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(file.id)
        .bind(&file.file_url)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match existing {
            Some((id,)) => {
                sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
                    r#"
                    UPDATE financial_transactions
                    SET company_id = $2, transaction_type = $3, category = $4, date = $5,
                        description = $6, entity_name = $7, total_amount = $8, amount_net = $9,
                        vat_amount = $10, vat_rate = $11, payment_method = $12,
                        invoice_number = $13, notes = $14, project_id = $15,
                        bank_account_id = $16, source_file_id = $17, updated_at = $18
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    TX_COLUMNS
                ))
                .bind(id)
                .bind(request.company_id)
                .bind(request.transaction_type)
                .bind(request.category)
                .bind(request.date)
                .bind(&request.description)
                .bind(&request.entity_name)
                .bind(request.total_amount)
                .bind(amount_net)
                .bind(vat_amount)
                .bind(request.vat_rate)
                .bind(request.payment_method)
                .bind(request.invoice_number.as_deref())
                .bind(request.notes.as_deref())
                .bind(request.project_id)
                .bind(request.bank_account_id)
                .bind(file.id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
                    r#"
                    INSERT INTO financial_transactions (
                        company_id, transaction_type, category, date, description, entity_name,
                        total_amount, amount_net, vat_amount, vat_rate, payment_method,
                        invoice_number, notes, project_id, bank_account_id,
                        source_file_id, invoice_file_url, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                            $16, $17, $18, $18)
                    RETURNING {}
                    "#,
                    TX_COLUMNS
                ))
                .bind(request.company_id)
                .bind(request.transaction_type)
                .bind(request.category)
                .bind(request.date)
                .bind(&request.description)
                .bind(&request.entity_name)
                .bind(request.total_amount)
                .bind(amount_net)
                .bind(vat_amount)
                .bind(request.vat_rate)
                .bind(request.payment_method)
                .bind(request.invoice_number.as_deref())
                .bind(request.notes.as_deref())
                .bind(request.project_id)
                .bind(request.bank_account_id)
                .bind(file.id)
                .bind(&file.file_url)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(transaction)
    }

    /// File the workflow file as a document in a company's folder tree.
    #[tracing::instrument(skip(self, file), fields(file_id = %file.id, company_id = %company_id))]
    pub async fn attach_document(
        &self,
        file: &WorkflowFile,
        company_id: Uuid,
        folder_id: Option<Uuid>,
        name: Option<&str>,
    ) -> Result<CompanyDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        self.reject_conflicting_shapes(&mut tx, file, Shape::Document)
            .await?;

        let now = Utc::now();
        let name = name.unwrap_or(&file.file_name);

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM company_documents WHERE file_url = $1 LIMIT 1")
                .bind(&file.file_url)
                .fetch_optional(&mut *tx)
                .await?;

        let document = match existing {
            Some((id,)) => {
                sqlx::query_as::<Postgres, CompanyDocument>(&format!(
                    r#"
                    UPDATE company_documents
                    SET company_id = $2, folder_id = $3, name = $4, updated_at = $5
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    DOC_COLUMNS
                ))
                .bind(id)
                .bind(company_id)
                .bind(folder_id)
                .bind(name)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, CompanyDocument>(&format!(
                    r#"
                    INSERT INTO company_documents (
                        company_id, folder_id, name, file_key, file_url, file_size,
                        mime_type, document_type, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
                    RETURNING {}
                    "#,
                    DOC_COLUMNS
                ))
                .bind(company_id)
                .bind(folder_id)
                .bind(name)
                .bind(&file.file_key)
                .bind(&file.file_url)
                .bind(file.file_size)
                .bind(file.mime_type.as_deref())
                .bind(file.category.as_deref())
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(document)
    }

    /// Save (or overwrite) the loan draft for a workflow file.
    ///
    /// Returns `None` when the draft already reached a terminal state —
    /// a registered or discarded draft never goes back to `drafted`.
    #[tracing::instrument(skip(self, file, request), fields(file_id = %file.id))]
    pub async fn save_loan_draft(
        &self,
        file: &WorkflowFile,
        request: &SaveLoanDraftRequest,
    ) -> Result<Option<LoanDraft>, AppError> {
        let mut tx = self.pool.begin().await?;

        self.reject_conflicting_shapes(&mut tx, file, Shape::Loan)
            .await?;

        let now = Utc::now();
        let draft = sqlx::query_as::<Postgres, LoanDraft>(&format!(
            r#"
            INSERT INTO loan_drafts (
                file_id, status, lending_company_id, borrowing_company_id, amount,
                interest_rate, monthly_payment, start_date, end_date, description,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            ON CONFLICT (file_id) DO UPDATE SET
                lending_company_id = EXCLUDED.lending_company_id,
                borrowing_company_id = EXCLUDED.borrowing_company_id,
                amount = EXCLUDED.amount,
                interest_rate = EXCLUDED.interest_rate,
                monthly_payment = EXCLUDED.monthly_payment,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                description = EXCLUDED.description,
                updated_at = EXCLUDED.updated_at
            WHERE loan_drafts.status = $2
            RETURNING {}
            "#,
            DRAFT_COLUMNS
        ))
        .bind(file.id)
        .bind(LoanDraftStatus::Drafted)
        .bind(request.lending_company_id)
        .bind(request.borrowing_company_id)
        .bind(request.amount)
        .bind(request.interest_rate)
        .bind(request.monthly_payment)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.description.as_deref())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(draft)
    }

    /// Reject the attach when a different shape already references the file.
    async fn reject_conflicting_shapes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        file: &WorkflowFile,
        attempted: Shape,
    ) -> Result<(), AppError> {
        if attempted != Shape::Transaction {
            let (has_tx,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (SELECT 1 FROM financial_transactions \
                 WHERE source_file_id = $1 OR invoice_file_url = $2)",
            )
            .bind(file.id)
            .bind(&file.file_url)
            .fetch_one(&mut **tx)
            .await?;
            if has_tx {
                return Err(conflict(file.id, Shape::Transaction, attempted));
            }
        }

        if attempted != Shape::Loan {
            let (has_loan,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (SELECT 1 FROM company_loans WHERE source_file_id = $1) \
                 OR EXISTS (SELECT 1 FROM loan_drafts WHERE file_id = $1 AND status = 'drafted')",
            )
            .bind(file.id)
            .fetch_one(&mut **tx)
            .await?;
            if has_loan {
                return Err(conflict(file.id, Shape::Loan, attempted));
            }
        }

        if attempted != Shape::Document {
            let (has_doc,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (SELECT 1 FROM company_documents WHERE file_url = $1)",
            )
            .bind(&file.file_url)
            .fetch_one(&mut **tx)
            .await?;
            if has_doc {
                return Err(conflict(file.id, Shape::Document, attempted));
            }
        }

        Ok(())
    }
}

fn conflict(file_id: Uuid, existing: Shape, attempted: Shape) -> AppError {
    AppError::RecordConflict {
        file_id,
        existing: existing.name(),
        attempted: attempted.name(),
    }
}
