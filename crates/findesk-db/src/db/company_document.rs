//! Company document repository: the permanent, per-company document store.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{CompanyDocument, NewCompanyDocument};
use findesk_core::AppError;

const SELECT_COLUMNS: &str = "id, company_id, folder_id, name, file_key, file_url, file_size, \
     mime_type, document_type, created_at, updated_at";

#[derive(Clone)]
pub struct CompanyDocumentRepository {
    pool: PgPool,
}

impl CompanyDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "company_documents", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<CompanyDocument>, AppError> {
        let doc = sqlx::query_as::<Postgres, CompanyDocument>(&format!(
            "SELECT {} FROM company_documents WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    /// Most recent document whose stored URL matches (matcher step 4).
    #[tracing::instrument(skip(self, file_url), fields(db.table = "company_documents"))]
    pub async fn latest_by_url(&self, file_url: &str) -> Result<Option<CompanyDocument>, AppError> {
        let doc = sqlx::query_as::<Postgres, CompanyDocument>(&format!(
            "SELECT {} FROM company_documents WHERE file_url = $1 \
             ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(file_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    #[tracing::instrument(skip(self, new_doc), fields(db.table = "company_documents", company_id = %new_doc.company_id))]
    pub async fn insert(&self, new_doc: &NewCompanyDocument) -> Result<CompanyDocument, AppError> {
        let now = Utc::now();
        let doc = sqlx::query_as::<Postgres, CompanyDocument>(&format!(
            r#"
            INSERT INTO company_documents (
                company_id, folder_id, name, file_key, file_url, file_size,
                mime_type, document_type, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(new_doc.company_id)
        .bind(new_doc.folder_id)
        .bind(&new_doc.name)
        .bind(&new_doc.file_key)
        .bind(&new_doc.file_url)
        .bind(new_doc.file_size)
        .bind(new_doc.mime_type.as_deref())
        .bind(new_doc.document_type.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(doc)
    }

    /// List a company's documents, optionally within one folder.
    #[tracing::instrument(skip(self), fields(db.table = "company_documents"))]
    pub async fn list_by_company(
        &self,
        company_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<CompanyDocument>, AppError> {
        let docs = sqlx::query_as::<Postgres, CompanyDocument>(&format!(
            r#"
            SELECT {}
            FROM company_documents
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR folder_id = $2)
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(company_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// Delete a document row (compensation for a failed completion run).
    #[tracing::instrument(skip(self), fields(db.table = "company_documents", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM company_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
