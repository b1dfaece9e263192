use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Status a workflow file gets stamped with when triage marks it done.
/// Status is free text in the table; this constant is the one value with
/// side effects (sets `completed_at`).
pub const STATUS_COMPLETED: &str = "Completed";

/// Default status and priority assigned at upload time.
pub const STATUS_PENDING: &str = "Pending";
pub const PRIORITY_NORMAL: &str = "normal";

/// Claim status held while a completion run is in flight. The claim is a
/// compare-and-swap: two concurrent completions cannot both take it.
pub const STATUS_COMPLETING: &str = "Completing";

/// A transient inbox record: a file awaiting financial triage.
///
/// Exists only while in triage; the completion engine deletes it once the
/// file has been reconciled into a company's permanent document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WorkflowFile {
    pub id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub priority: String,
    pub category: Option<String>,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowFile {
    /// Whether triage has marked this file completed.
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_COMPLETED)
    }
}

/// API response for a workflow file.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowFileResponse {
    pub id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub priority: String,
    pub category: Option<String>,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<WorkflowFile> for WorkflowFileResponse {
    fn from(f: WorkflowFile) -> Self {
        WorkflowFileResponse {
            id: f.id,
            file_name: f.file_name,
            file_url: f.file_url,
            file_size: f.file_size,
            mime_type: f.mime_type,
            status: f.status,
            notes: f.notes,
            priority: f.priority,
            category: f.category,
            company_id: f.company_id,
            created_at: f.created_at,
            completed_at: f.completed_at,
        }
    }
}

/// Request DTO for updating triage fields of a workflow file.
///
/// All fields are optional; only the provided ones change. `category` and
/// `company_id` use `Option<Option<_>>` to distinguish "no change" from
/// "clear the value".
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateWorkflowFileRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Uuid>)]
    pub company_id: Option<Option<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(status: &str) -> WorkflowFile {
        let now = Utc::now();
        WorkflowFile {
            id: Uuid::new_v4(),
            file_name: "invoice.pdf".to_string(),
            file_key: "inbox/1700000000_invoice.pdf".to_string(),
            file_url: "http://localhost:4000/files/inbox/1700000000_invoice.pdf".to_string(),
            file_size: Some(2048),
            mime_type: Some("application/pdf".to_string()),
            status: status.to_string(),
            notes: None,
            priority: PRIORITY_NORMAL.to_string(),
            category: None,
            company_id: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_completed_case_insensitive() {
        assert!(sample_file("Completed").is_completed());
        assert!(sample_file("completed").is_completed());
        assert!(!sample_file("Pending").is_completed());
        assert!(!sample_file("In Progress").is_completed());
    }

    #[test]
    fn test_response_from_file() {
        let file = sample_file(STATUS_PENDING);
        let id = file.id;
        let response = WorkflowFileResponse::from(file);
        assert_eq!(response.id, id);
        assert_eq!(response.file_name, "invoice.pdf");
        assert_eq!(response.status, STATUS_PENDING);
        assert_eq!(response.priority, PRIORITY_NORMAL);
    }
}
