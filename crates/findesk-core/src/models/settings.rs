use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow settings: a singleton row read by the completion engine.
///
/// `default_company_id` is the fallback target when a file has no linked
/// transaction. `link_workflow_to_finance` gates the matcher on file open;
/// `auto_create_transaction` lets the editor panel pre-save a transaction
/// when a file is opened.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WorkflowSettings {
    pub id: i32,
    pub default_company_id: Option<Uuid>,
    pub auto_create_transaction: bool,
    pub link_workflow_to_finance: bool,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for updating workflow settings. Only provided fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    #[schema(value_type = Option<Uuid>)]
    pub default_company_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub auto_create_transaction: Option<bool>,
    #[serde(default)]
    pub link_workflow_to_finance: Option<bool>,
}
