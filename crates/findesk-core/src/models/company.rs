use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A company whose documents and finances are managed by the back office.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bank account or credit card belonging to a company.
///
/// The owning company matters to completion: a transaction paid from an
/// account owned by a different company than the target produces a second
/// archive copy for the account's owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BankAccount {
    pub id: Uuid,
    pub company_id: Uuid,
    pub account_name: String,
    pub account_type: BankAccountType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "bank_account_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BankAccountType {
    BankAccount,
    CreditCard,
}

/// Request DTO for creating a company
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Company name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// Request DTO for creating a bank account
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBankAccountRequest {
    pub company_id: Uuid,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Account name must be between 1 and 255 characters"
    ))]
    pub account_name: String,
    pub account_type: BankAccountType,
}
