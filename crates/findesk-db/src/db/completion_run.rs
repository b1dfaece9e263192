//! Completion run repository: the durable saga log.
//!
//! Every completion attempt gets a row; side effects (uploads, document
//! inserts, loan registration) are appended to `steps` as they succeed, so a
//! failed or crashed run can be compensated from the log.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{CompletionRun, CompletionRunStatus, CompletionStep};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "id, file_id, status, steps, error, started_at, finished_at";

#[derive(Clone)]
pub struct CompletionRunRepository {
    pool: PgPool,
}

impl CompletionRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new run for a file.
    #[tracing::instrument(skip(self), fields(db.table = "completion_runs", file_id = %file_id))]
    pub async fn create(&self, file_id: Uuid) -> Result<CompletionRun, AppError> {
        let run = sqlx::query_as::<Postgres, CompletionRun>(&format!(
            r#"
            INSERT INTO completion_runs (file_id, status, steps, started_at)
            VALUES ($1, $2, '[]'::jsonb, $3)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(file_id)
        .bind(CompletionRunStatus::Running)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(run)
    }

    #[tracing::instrument(skip(self), fields(db.table = "completion_runs", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<CompletionRun>, AppError> {
        let run = sqlx::query_as::<Postgres, CompletionRun>(&format!(
            "SELECT {} FROM completion_runs WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    /// Append a completed step to the run's log.
    #[tracing::instrument(skip(self, step), fields(db.table = "completion_runs", db.record_id = %id))]
    pub async fn append_step(&self, id: Uuid, step: &CompletionStep) -> Result<(), AppError> {
        let value = serde_json::to_value(step)?;
        sqlx::query(
            r#"
            UPDATE completion_runs
            SET steps = steps || jsonb_build_array($2::jsonb)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Close a run with its final status.
    #[tracing::instrument(skip(self, error), fields(db.table = "completion_runs", db.record_id = %id))]
    pub async fn finish(
        &self,
        id: Uuid,
        status: CompletionRunStatus,
        error: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE completion_runs
            SET status = $2, error = $3, finished_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Runs left `running` since before the cutoff — a crashed process never
    /// finished them. Recovery compensates these.
    #[tracing::instrument(skip(self), fields(db.table = "completion_runs"))]
    pub async fn list_stalled(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<CompletionRun>, AppError> {
        let runs = sqlx::query_as::<Postgres, CompletionRun>(&format!(
            "SELECT {} FROM completion_runs WHERE status = $1 AND started_at < $2 \
             ORDER BY started_at ASC",
            SELECT_COLUMNS
        ))
        .bind(CompletionRunStatus::Running)
        .bind(older_than)
        .fetch_all(&self.pool)
        .await?;
        Ok(runs)
    }
}
