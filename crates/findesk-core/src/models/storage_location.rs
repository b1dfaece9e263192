use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Maps (company, calendar year, calendar month) to the folder where a
/// completed file's permanent copy lands. At most one location exists per
/// triple (database unique constraint).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StorageLocation {
    pub id: Uuid,
    pub company_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub folder_id: Option<Uuid>,
    pub folder_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StorageLocation {
    /// Path segment for archive keys; falls back to year/month when no
    /// folder path is configured.
    pub fn archive_folder_path(&self) -> String {
        match self.folder_path.as_deref() {
            Some(path) if !path.trim().is_empty() => path.trim_matches('/').to_string(),
            _ => format!("{}/{:02}", self.year, self.month),
        }
    }
}

/// Request DTO for configuring a storage location.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpsertStorageLocationRequest {
    pub company_id: Uuid,
    #[validate(range(min = 2000, max = 2100, message = "Year out of range"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub folder_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(folder_path: Option<&str>) -> StorageLocation {
        let now = Utc::now();
        StorageLocation {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            year: 2025,
            month: 3,
            folder_id: None,
            folder_path: folder_path.map(String::from),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_archive_folder_path_from_folder() {
        let loc = location(Some("Invoices/2025/March"));
        assert_eq!(loc.archive_folder_path(), "Invoices/2025/March");
    }

    #[test]
    fn test_archive_folder_path_trims_slashes() {
        let loc = location(Some("/Invoices/March/"));
        assert_eq!(loc.archive_folder_path(), "Invoices/March");
    }

    #[test]
    fn test_archive_folder_path_fallback() {
        let loc = location(None);
        assert_eq!(loc.archive_folder_path(), "2025/03");
        let blank = location(Some("   "));
        assert_eq!(blank.archive_folder_path(), "2025/03");
    }
}
