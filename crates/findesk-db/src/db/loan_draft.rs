//! Loan draft repository.
//!
//! Drafts are keyed by workflow file id and carry a status column so the
//! lifecycle (`drafted -> registered | discarded`) is durable: a draft
//! survives session loss and a discard is recorded instead of silent.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{LoanDraft, LoanDraftStatus};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "file_id, status, lending_company_id, borrowing_company_id, \
     amount, interest_rate, monthly_payment, start_date, end_date, description, \
     created_at, updated_at";

#[derive(Clone)]
pub struct LoanDraftRepository {
    pool: PgPool,
}

impl LoanDraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "loan_drafts"))]
    pub async fn get(&self, file_id: Uuid) -> Result<Option<LoanDraft>, AppError> {
        let draft = sqlx::query_as::<Postgres, LoanDraft>(&format!(
            "SELECT {} FROM loan_drafts WHERE file_id = $1",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(draft)
    }

    /// The queued draft for a file, if one is still in the `drafted` state.
    #[tracing::instrument(skip(self), fields(db.table = "loan_drafts"))]
    pub async fn get_drafted(&self, file_id: Uuid) -> Result<Option<LoanDraft>, AppError> {
        let draft = sqlx::query_as::<Postgres, LoanDraft>(&format!(
            "SELECT {} FROM loan_drafts WHERE file_id = $1 AND status = $2",
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .bind(LoanDraftStatus::Drafted)
        .fetch_optional(&self.pool)
        .await?;
        Ok(draft)
    }

    /// Transition `drafted -> registered`. Returns false if the draft was
    /// not in the `drafted` state.
    #[tracing::instrument(skip(self), fields(db.table = "loan_drafts"))]
    pub async fn mark_registered(&self, file_id: Uuid) -> Result<bool, AppError> {
        self.transition(file_id, LoanDraftStatus::Registered).await
    }

    /// Transition `drafted -> discarded` (file deleted before completion).
    #[tracing::instrument(skip(self), fields(db.table = "loan_drafts"))]
    pub async fn mark_discarded(&self, file_id: Uuid) -> Result<bool, AppError> {
        self.transition(file_id, LoanDraftStatus::Discarded).await
    }

    /// Compensation path: put a draft that was marked registered back into
    /// `drafted` when the completion run it belonged to is rolled back.
    #[tracing::instrument(skip(self), fields(db.table = "loan_drafts"))]
    pub async fn reopen(&self, file_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE loan_drafts
            SET status = $2, updated_at = $3
            WHERE file_id = $1 AND status = $4
            "#,
        )
        .bind(file_id)
        .bind(LoanDraftStatus::Drafted)
        .bind(Utc::now())
        .bind(LoanDraftStatus::Registered)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn transition(&self, file_id: Uuid, to: LoanDraftStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE loan_drafts
            SET status = $2, updated_at = $3
            WHERE file_id = $1 AND status = $4
            "#,
        )
        .bind(file_id)
        .bind(to)
        .bind(Utc::now())
        .bind(LoanDraftStatus::Drafted)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
