//! Financial transaction repository.
//!
//! Lookup order matters to the matcher: the `source_file_id` back-reference
//! is authoritative; the stored invoice URL is a legacy fallback that gets
//! repaired (`link_source_file`) when hit.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{CreateTransactionRequest, FinancialTransaction};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "id, company_id, transaction_type, category, date, description, \
     entity_name, total_amount, amount_net, vat_amount, vat_rate, payment_method, \
     invoice_number, notes, project_id, bank_account_id, source_file_id, invoice_file_url, \
     created_at, updated_at";

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "financial_transactions", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<FinancialTransaction>, AppError> {
        let tx = sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
            "SELECT {} FROM financial_transactions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }

    /// Transaction whose back-reference is the given workflow file.
    #[tracing::instrument(skip(self), fields(db.table = "financial_transactions"))]
    pub async fn get_by_source_file(
        &self,
        file_id: Uuid,
    ) -> Result<Option<FinancialTransaction>, AppError> {
        let tx = sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
            "SELECT {} FROM financial_transactions WHERE source_file_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }

    /// Most recent transaction whose stored invoice URL matches.
    #[tracing::instrument(skip(self, file_url), fields(db.table = "financial_transactions"))]
    pub async fn latest_by_file_url(
        &self,
        file_url: &str,
    ) -> Result<Option<FinancialTransaction>, AppError> {
        let tx = sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
            "SELECT {} FROM financial_transactions WHERE invoice_file_url = $1 \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(file_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }

    /// Repair an empty back-reference after a URL-fallback match.
    #[tracing::instrument(skip(self), fields(db.table = "financial_transactions", db.record_id = %id))]
    pub async fn link_source_file(&self, id: Uuid, file_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE financial_transactions
            SET source_file_id = $2, updated_at = $3
            WHERE id = $1 AND source_file_id IS NULL
            "#,
        )
        .bind(id)
        .bind(file_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a transaction registered from a workflow file.
    #[tracing::instrument(skip(self, request), fields(db.table = "financial_transactions"))]
    pub async fn create_for_file(
        &self,
        request: &CreateTransactionRequest,
        amount_net: Decimal,
        vat_amount: Decimal,
        source_file_id: Uuid,
        invoice_file_url: &str,
    ) -> Result<FinancialTransaction, AppError> {
        let now = Utc::now();
        let tx = sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
            r#"
            INSERT INTO financial_transactions (
                company_id, transaction_type, category, date, description, entity_name,
                total_amount, amount_net, vat_amount, vat_rate, payment_method,
                invoice_number, notes, project_id, bank_account_id,
                source_file_id, invoice_file_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
            RETURNING {}
            "#,
            SELECT_COLUMNS
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
        .bind(source_file_id)
        .bind(invoice_file_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(tx)
    }

    /// Overwrite the transaction already linked to a workflow file (re-edit
    /// from the editor panel before completion).
    #[tracing::instrument(skip(self, request), fields(db.table = "financial_transactions", db.record_id = %id))]
    pub async fn update_for_file(
        &self,
        id: Uuid,
        request: &CreateTransactionRequest,
        amount_net: Decimal,
        vat_amount: Decimal,
    ) -> Result<Option<FinancialTransaction>, AppError> {
        let now = Utc::now();
        let tx = sqlx::query_as::<Postgres, FinancialTransaction>(&format!(
            r#"
            UPDATE financial_transactions
            SET company_id = $2, transaction_type = $3, category = $4, date = $5,
                description = $6, entity_name = $7, total_amount = $8, amount_net = $9,
                vat_amount = $10, vat_rate = $11, payment_method = $12,
                invoice_number = $13, notes = $14, project_id = $15,
                bank_account_id = $16, updated_at = $17
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
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
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }
}
