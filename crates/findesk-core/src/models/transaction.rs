use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "transaction_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Notification,
    Receipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "transaction_category", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Sales,
    Materials,
    Salaries,
    Services,
    Taxes,
    Utilities,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Check,
    CreditCard,
    DebitCard,
    Mbway,
    Multibanco,
}

/// A monetary movement (expense, income, receipt, or notification) recorded
/// against a company, optionally sourced from a workflow file.
///
/// `source_file_id` is the authoritative back-reference to the inbox file a
/// transaction was registered from; `invoice_file_url` is the legacy URL link
/// the matcher falls back to (and repairs) when the back-reference is empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FinancialTransaction {
    pub id: Uuid,
    pub company_id: Uuid,
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub date: NaiveDate,
    pub description: String,
    pub entity_name: String,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    #[schema(value_type = f64)]
    pub amount_net: Decimal,
    #[schema(value_type = Option<f64>)]
    pub vat_amount: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub vat_rate: Option<Decimal>,
    pub payment_method: PaymentMethod,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub project_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub source_file_id: Option<Uuid>,
    pub invoice_file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialTransaction {
    /// Whether this transaction carries no monetary value. Completion treats
    /// zero-amount transactions the same as a missing record: the caller must
    /// decide explicitly.
    pub fn is_zero_amount(&self) -> bool {
        self.total_amount.is_zero()
    }
}

/// Request DTO for registering a transaction against a workflow file
/// (the editor panel's save contract).
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateTransactionRequest {
    pub company_id: Uuid,
    pub transaction_type: TransactionType,
    #[serde(default = "default_category")]
    pub category: TransactionCategory,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 255, message = "Counterparty name is required"))]
    pub entity_name: String,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    #[schema(value_type = Option<f64>)]
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub bank_account_id: Option<Uuid>,
}

fn default_category() -> TransactionCategory {
    TransactionCategory::Other
}

impl CreateTransactionRequest {
    /// Split the gross amount into net and VAT portions.
    ///
    /// The VAT rate is a percentage applied on top of the net amount, so the
    /// VAT share of a gross total is `total - total / (1 + rate/100)`.
    pub fn vat_breakdown(&self) -> (Decimal, Decimal) {
        let rate = self.vat_rate.unwrap_or_default();
        if rate.is_zero() {
            return (self.total_amount, Decimal::ZERO);
        }
        let divisor = Decimal::ONE + rate / Decimal::from(100);
        let net = (self.total_amount / divisor).round_dp(2);
        let vat = self.total_amount - net;
        (net, vat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn request(total: Decimal, vat_rate: Option<Decimal>) -> CreateTransactionRequest {
        CreateTransactionRequest {
            company_id: Uuid::new_v4(),
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Other,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            description: "Office supplies".to_string(),
            entity_name: "Staples Lda".to_string(),
            total_amount: total,
            vat_rate,
            payment_method: PaymentMethod::BankTransfer,
            invoice_number: None,
            notes: None,
            project_id: None,
            bank_account_id: None,
        }
    }

    #[test]
    fn test_vat_breakdown_standard_rate() {
        let req = request(dec("123.00"), Some(dec("23")));
        let (net, vat) = req.vat_breakdown();
        assert_eq!(net, dec("100.00"));
        assert_eq!(vat, dec("23.00"));
        assert_eq!(net + vat, req.total_amount);
    }

    #[test]
    fn test_vat_breakdown_zero_rate() {
        let req = request(dec("50.00"), None);
        let (net, vat) = req.vat_breakdown();
        assert_eq!(net, dec("50.00"));
        assert!(vat.is_zero());
    }

    #[test]
    fn test_vat_breakdown_sums_to_total() {
        let req = request(dec("99.99"), Some(dec("6")));
        let (net, vat) = req.vat_breakdown();
        assert_eq!(net + vat, dec("99.99"));
    }

    #[test]
    fn test_is_zero_amount() {
        let now = Utc::now();
        let tx = FinancialTransaction {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Other,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: "test".to_string(),
            entity_name: "test".to_string(),
            total_amount: Decimal::ZERO,
            amount_net: Decimal::ZERO,
            vat_amount: None,
            vat_rate: None,
            payment_method: PaymentMethod::Cash,
            invoice_number: None,
            notes: None,
            project_id: None,
            bank_account_id: None,
            source_file_id: None,
            invoice_file_url: None,
            created_at: now,
            updated_at: now,
        };
        assert!(tx.is_zero_amount());
    }
}
