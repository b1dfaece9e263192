use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Document type stamped on archive copies produced for a registered loan.
pub const DOCUMENT_TYPE_LOAN: &str = "Loan";

/// Folder in a company's document tree.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanyFolder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub parent_folder_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A file filed into a company's permanent document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanyDocument {
    pub id: Uuid,
    pub company_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub document_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a permanent document record (completion output).
#[derive(Debug, Clone)]
pub struct NewCompanyDocument {
    pub company_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub document_type: Option<String>,
}

/// Request DTO for creating a folder in a company's document tree.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateFolderRequest {
    pub company_id: Uuid,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Folder name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub parent_folder_id: Option<Uuid>,
}
