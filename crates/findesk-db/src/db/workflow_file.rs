//! Workflow file repository: CRUD and completion claim for the inbox table.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{
    UpdateWorkflowFileRequest, WorkflowFile, PRIORITY_NORMAL, STATUS_COMPLETED, STATUS_COMPLETING,
    STATUS_PENDING,
};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "id, file_name, file_key, file_url, file_size, mime_type, status, \
     notes, priority, category, company_id, created_at, completed_at, updated_at";

#[derive(Clone)]
pub struct WorkflowFileRepository {
    pool: PgPool,
}

impl WorkflowFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly uploaded file into the inbox.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_files"))]
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        file_name: &str,
        file_key: &str,
        file_url: &str,
        file_size: Option<i64>,
        mime_type: Option<&str>,
        category: Option<&str>,
    ) -> Result<WorkflowFile, AppError> {
        let now = Utc::now();
        let file = sqlx::query_as::<Postgres, WorkflowFile>(
            r#"
            INSERT INTO workflow_files (
                file_name, file_key, file_url, file_size, mime_type,
                status, priority, category, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id, file_name, file_key, file_url, file_size, mime_type, status,
                notes, priority, category, company_id, created_at, completed_at, updated_at
            "#,
        )
        .bind(file_name)
        .bind(file_key)
        .bind(file_url)
        .bind(file_size)
        .bind(mime_type)
        .bind(STATUS_PENDING)
        .bind(PRIORITY_NORMAL)
        .bind(category)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<WorkflowFile>, AppError> {
        let file = sqlx::query_as::<Postgres, WorkflowFile>(&format!(
            "SELECT {} FROM workflow_files WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    /// List inbox files newest first, optionally filtered by category and a
    /// case-insensitive search over name and notes.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_files"))]
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<WorkflowFile>, AppError> {
        let pattern = search.map(|s| format!("%{}%", s));
        let files = sqlx::query_as::<Postgres, WorkflowFile>(&format!(
            r#"
            SELECT {}
            FROM workflow_files
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR file_name ILIKE $2 OR notes ILIKE $2)
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(category)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    /// Update triage fields. Only non-None fields change; setting the status
    /// to `Completed` stamps `completed_at`, any other status clears it.
    #[tracing::instrument(skip(self, update), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateWorkflowFileRequest,
    ) -> Result<Option<WorkflowFile>, AppError> {
        let now = Utc::now();
        let completed_at = update.status.as_deref().map(|s| {
            if s.eq_ignore_ascii_case(STATUS_COMPLETED) {
                Some(now)
            } else {
                None
            }
        });

        let file = sqlx::query_as::<Postgres, WorkflowFile>(
            r#"
            UPDATE workflow_files
            SET
                status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                file_name = COALESCE($4, file_name),
                notes = COALESCE($5, notes),
                category = CASE WHEN $6 THEN $7::text ELSE category END,
                company_id = CASE WHEN $8 THEN $9::uuid ELSE company_id END,
                completed_at = CASE WHEN $10 THEN $11::timestamptz ELSE completed_at END,
                updated_at = $12
            WHERE id = $1
            RETURNING id, file_name, file_key, file_url, file_size, mime_type, status,
                notes, priority, category, company_id, created_at, completed_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.status.as_deref())
        .bind(update.priority.as_deref())
        .bind(update.file_name.as_deref())
        .bind(update.notes.as_deref())
        .bind(update.category.is_some())
        .bind(update.category.clone().flatten())
        .bind(update.company_id.is_some())
        .bind(update.company_id.flatten())
        .bind(completed_at.is_some())
        .bind(completed_at.flatten())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workflow_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-claim a file for completion.
    ///
    /// Returns the file (with its pre-claim status, for release) only if no
    /// other completion holds the claim and the file was not already
    /// completed. The row's status becomes `Completing` atomically.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn claim_for_completion(&self, id: Uuid) -> Result<Option<WorkflowFile>, AppError> {
        let file = sqlx::query_as::<Postgres, WorkflowFile>(
            r#"
            UPDATE workflow_files AS w
            SET status = $2, updated_at = $3
            FROM (SELECT id, status FROM workflow_files WHERE id = $1 FOR UPDATE) AS prev
            WHERE w.id = prev.id
              AND prev.status <> $2
              AND w.completed_at IS NULL
            RETURNING w.id, w.file_name, w.file_key, w.file_url, w.file_size, w.mime_type,
                prev.status AS status, w.notes, w.priority, w.category, w.company_id,
                w.created_at, w.completed_at, w.updated_at
            "#,
        )
        .bind(id)
        .bind(STATUS_COMPLETING)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    /// Release a completion claim, restoring the pre-claim status. No-op if
    /// the row is gone or the claim was not held.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn release_claim(&self, id: Uuid, previous_status: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE workflow_files
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(previous_status)
        .bind(Utc::now())
        .bind(STATUS_COMPLETING)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete the inbox row, but only while this completion still holds the
    /// claim. A concurrent delete or a lost claim makes this a no-op.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_files", db.record_id = %id))]
    pub async fn delete_claimed(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workflow_files WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(STATUS_COMPLETING)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
