//! Company folder repository.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::CompanyFolder;
use findesk_core::AppError;

const SELECT_COLUMNS: &str =
    "id, company_id, name, parent_folder_id, created_at, updated_at";

#[derive(Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "company_folders"))]
    pub async fn create(
        &self,
        company_id: Uuid,
        name: &str,
        parent_folder_id: Option<Uuid>,
    ) -> Result<CompanyFolder, AppError> {
        let now = Utc::now();
        let folder = sqlx::query_as::<Postgres, CompanyFolder>(&format!(
            r#"
            INSERT INTO company_folders (company_id, name, parent_folder_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .bind(name)
        .bind(parent_folder_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(folder)
    }

    #[tracing::instrument(skip(self), fields(db.table = "company_folders", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<CompanyFolder>, AppError> {
        let folder = sqlx::query_as::<Postgres, CompanyFolder>(&format!(
            "SELECT {} FROM company_folders WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(folder)
    }

    #[tracing::instrument(skip(self), fields(db.table = "company_folders"))]
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<CompanyFolder>, AppError> {
        let folders = sqlx::query_as::<Postgres, CompanyFolder>(&format!(
            "SELECT {} FROM company_folders WHERE company_id = $1 ORDER BY name ASC",
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(folders)
    }

    /// Root-to-leaf display path for a folder, used when a storage location
    /// has a folder reference but no explicit path override.
    #[tracing::instrument(skip(self), fields(db.table = "company_folders", db.record_id = %id))]
    pub async fn path_of(&self, id: Uuid) -> Result<Option<String>, AppError> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            WITH RECURSIVE chain AS (
                SELECT id, name, parent_folder_id, 1 AS depth
                FROM company_folders WHERE id = $1
                UNION ALL
                SELECT f.id, f.name, f.parent_folder_id, chain.depth + 1
                FROM company_folders f
                JOIN chain ON f.id = chain.parent_folder_id
                WHERE chain.depth < 32
            )
            SELECT string_agg(name, '/' ORDER BY depth DESC) FROM chain
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(path,)| path))
    }
}
