use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "loan_status", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Paid,
    Overdue,
    Cancelled,
}

/// A registered loan: a transfer between two companies (lender and borrower),
/// optionally sourced from a workflow file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Loan {
    pub id: Uuid,
    pub lending_company_id: Uuid,
    pub borrowing_company_id: Uuid,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = Option<f64>)]
    pub interest_rate: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub monthly_payment: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub description: Option<String>,
    pub source_file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a loan draft captured for a workflow file:
/// `drafted` until completion registers it, `discarded` if the file is
/// deleted first. `registered` and `discarded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "loan_draft_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum LoanDraftStatus {
    Drafted,
    Registered,
    Discarded,
}

impl LoanDraftStatus {
    /// Whether a draft in this state can still change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanDraftStatus::Registered | LoanDraftStatus::Discarded)
    }
}

/// Loan data captured in the editor panel for a workflow file, persisted so
/// it survives session loss. Graduates into a registered [`Loan`] when the
/// file is completed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoanDraft {
    pub file_id: Uuid,
    pub status: LoanDraftStatus,
    pub lending_company_id: Uuid,
    pub borrowing_company_id: Uuid,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = Option<f64>)]
    pub interest_rate: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub monthly_payment: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for saving (or overwriting) a loan draft for a workflow file.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SaveLoanDraftRequest {
    pub lending_company_id: Uuid,
    pub borrowing_company_id: Uuid,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub interest_rate: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub monthly_payment: Option<Decimal>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_status_terminality() {
        assert!(!LoanDraftStatus::Drafted.is_terminal());
        assert!(LoanDraftStatus::Registered.is_terminal());
        assert!(LoanDraftStatus::Discarded.is_terminal());
    }
}
