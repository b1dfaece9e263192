//! Workflow settings repository (singleton row).

use chrono::Utc;
use sqlx::{PgPool, Postgres};

use findesk_core::models::{UpdateSettingsRequest, WorkflowSettings};
use findesk_core::AppError;

/// The one row settings live in.
const SETTINGS_ROW_ID: i32 = 1;

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch settings, creating the default row on first access.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_settings"))]
    pub async fn get(&self) -> Result<WorkflowSettings, AppError> {
        let settings = sqlx::query_as::<Postgres, WorkflowSettings>(
            r#"
            INSERT INTO workflow_settings (id, auto_create_transaction, link_workflow_to_finance, updated_at)
            VALUES ($1, false, true, $2)
            ON CONFLICT (id) DO UPDATE SET id = workflow_settings.id
            RETURNING id, default_company_id, auto_create_transaction, link_workflow_to_finance, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    /// Update settings. Only provided fields change.
    #[tracing::instrument(skip(self, update), fields(db.table = "workflow_settings"))]
    pub async fn update(
        &self,
        update: &UpdateSettingsRequest,
    ) -> Result<WorkflowSettings, AppError> {
        // Ensure the row exists before updating it.
        self.get().await?;

        let settings = sqlx::query_as::<Postgres, WorkflowSettings>(
            r#"
            UPDATE workflow_settings
            SET
                default_company_id = CASE WHEN $2 THEN $3::uuid ELSE default_company_id END,
                auto_create_transaction = COALESCE($4, auto_create_transaction),
                link_workflow_to_finance = COALESCE($5, link_workflow_to_finance),
                updated_at = $6
            WHERE id = $1
            RETURNING id, default_company_id, auto_create_transaction, link_workflow_to_finance, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(update.default_company_id.is_some())
        .bind(update.default_company_id.flatten())
        .bind(update.auto_create_transaction)
        .bind(update.link_workflow_to_finance)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
