use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "completion_run_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRunStatus {
    Running,
    Completed,
    Failed,
    Compensated,
}

/// Durable log of one completion attempt for a workflow file.
///
/// `steps` records what the run created (uploads, document rows, a registered
/// loan) so a failed or crashed run can be compensated instead of leaving an
/// orphaned inbox file next to partial archive copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompletionRun {
    pub id: Uuid,
    pub file_id: Uuid,
    pub status: CompletionRunStatus,
    pub steps: serde_json::Value,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CompletionRun {
    /// Decode the recorded steps. Unknown entries are dropped rather than
    /// failing recovery.
    pub fn decoded_steps(&self) -> Vec<CompletionStep> {
        match self.steps.as_array() {
            Some(items) => items
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// A side effect produced by a completion run, recorded in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CompletionStep {
    /// A loan draft was materialized as a registered loan.
    LoanRegistered { loan_id: Uuid },
    /// The file's bytes were copied into a company's archive namespace.
    CopyUploaded { company_id: Uuid, file_key: String },
    /// A permanent document row was inserted for a company.
    DocumentInserted {
        company_id: Uuid,
        document_id: Uuid,
    },
}

/// Result of a successful completion, returned to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompletionReport {
    pub file_id: Uuid,
    pub run_id: Uuid,
    /// Permanent document records created, one per destination company.
    pub document_ids: Vec<Uuid>,
    /// The loan registered from a draft, when one was queued.
    pub loan_id: Option<Uuid>,
    /// Whether the file was completed without any financial record
    /// (explicit caller choice).
    pub without_record: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_round_trip() {
        let steps = vec![
            CompletionStep::LoanRegistered {
                loan_id: Uuid::new_v4(),
            },
            CompletionStep::CopyUploaded {
                company_id: Uuid::new_v4(),
                file_key: "archive/acme/2025/03/1700000000_invoice.pdf".to_string(),
            },
            CompletionStep::DocumentInserted {
                company_id: Uuid::new_v4(),
                document_id: Uuid::new_v4(),
            },
        ];
        let json = serde_json::to_value(&steps).unwrap();
        let run = CompletionRun {
            id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            status: CompletionRunStatus::Running,
            steps: json,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        };
        assert_eq!(run.decoded_steps(), steps);
    }

    #[test]
    fn test_decoded_steps_skips_unknown_entries() {
        let run = CompletionRun {
            id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            status: CompletionRunStatus::Running,
            steps: serde_json::json!([
                {"step": "unknown_future_step", "data": 1},
                {"step": "loan_registered", "loan_id": Uuid::new_v4()},
            ]),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        };
        assert_eq!(run.decoded_steps().len(), 1);
    }

    #[test]
    fn test_decoded_steps_non_array() {
        let run = CompletionRun {
            id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            status: CompletionRunStatus::Failed,
            steps: serde_json::Value::Null,
            error: Some("storage down".to_string()),
            started_at: Utc::now(),
            finished_at: Some(Utc::now()),
        };
        assert!(run.decoded_steps().is_empty());
    }
}
