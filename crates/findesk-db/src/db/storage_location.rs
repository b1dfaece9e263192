//! Storage location repository: the (company, year, month) -> folder mapping
//! consulted by the completion engine. Uniqueness per triple is a database
//! constraint; `upsert` overwrites the existing mapping.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::StorageLocation;
use findesk_core::AppError;

const SELECT_COLUMNS: &str =
    "id, company_id, year, month, folder_id, folder_path, created_at, updated_at";

#[derive(Clone)]
pub struct StorageLocationRepository {
    pool: PgPool,
}

impl StorageLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The location for (company, year, month), if configured.
    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", company_id = %company_id, year, month))]
    pub async fn find(
        &self,
        company_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<Option<StorageLocation>, AppError> {
        let location = sqlx::query_as::<Postgres, StorageLocation>(&format!(
            "SELECT {} FROM storage_locations \
             WHERE company_id = $1 AND year = $2 AND month = $3",
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(location)
    }

    /// Create or overwrite the location for a (company, year, month) triple.
    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", company_id = %company_id, year, month))]
    pub async fn upsert(
        &self,
        company_id: Uuid,
        year: i32,
        month: i32,
        folder_id: Option<Uuid>,
        folder_path: Option<&str>,
    ) -> Result<StorageLocation, AppError> {
        let now = Utc::now();
        let location = sqlx::query_as::<Postgres, StorageLocation>(&format!(
            r#"
            INSERT INTO storage_locations (
                company_id, year, month, folder_id, folder_path, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (company_id, year, month) DO UPDATE SET
                folder_id = EXCLUDED.folder_id,
                folder_path = EXCLUDED.folder_path,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .bind(year)
        .bind(month)
        .bind(folder_id)
        .bind(folder_path)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(location)
    }

    #[tracing::instrument(skip(self), fields(db.table = "storage_locations", company_id = %company_id))]
    pub async fn list_by_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<StorageLocation>, AppError> {
        let locations = sqlx::query_as::<Postgres, StorageLocation>(&format!(
            "SELECT {} FROM storage_locations WHERE company_id = $1 \
             ORDER BY year DESC, month DESC",
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }
}
