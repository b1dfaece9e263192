//! Loan repository: registered inter-company loans.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{Loan, LoanDraft, LoanStatus};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "id, lending_company_id, borrowing_company_id, amount, \
     interest_rate, monthly_payment, start_date, end_date, status, description, \
     source_file_id, created_at, updated_at";

#[derive(Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "company_loans", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Loan>, AppError> {
        let loan = sqlx::query_as::<Postgres, Loan>(&format!(
            "SELECT {} FROM company_loans WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Loan whose source-file reference is the given workflow file.
    #[tracing::instrument(skip(self), fields(db.table = "company_loans"))]
    pub async fn get_by_source_file(&self, file_id: Uuid) -> Result<Option<Loan>, AppError> {
        let loan = sqlx::query_as::<Postgres, Loan>(&format!(
            "SELECT {} FROM company_loans WHERE source_file_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Materialize a drafted loan as a registered row (completion step).
    #[tracing::instrument(skip(self, draft), fields(db.table = "company_loans"))]
    pub async fn register_from_draft(&self, draft: &LoanDraft) -> Result<Loan, AppError> {
        let now = Utc::now();
        let loan = sqlx::query_as::<Postgres, Loan>(&format!(
            r#"
            INSERT INTO company_loans (
                lending_company_id, borrowing_company_id, amount, interest_rate,
                monthly_payment, start_date, end_date, status, description,
                source_file_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(draft.lending_company_id)
        .bind(draft.borrowing_company_id)
        .bind(draft.amount)
        .bind(draft.interest_rate)
        .bind(draft.monthly_payment)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(LoanStatus::Active)
        .bind(draft.description.as_deref())
        .bind(draft.file_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Delete a loan row (compensation for a failed completion run).
    #[tracing::instrument(skip(self), fields(db.table = "company_loans", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM company_loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
