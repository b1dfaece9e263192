use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::CompanyDocument;
use super::loan::Loan;
use super::transaction::FinancialTransaction;

/// The financial shape linked to a workflow file.
///
/// Each shape lives in its own table; this enum unifies them in memory for
/// the editor panel and the completion engine. A workflow file has at most
/// one shape at a time — enforced at write time by the record linker, and
/// resolved in priority order by the matcher for pre-existing data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FinancialRecord {
    Transaction(FinancialTransaction),
    Loan(Loan),
    Document(CompanyDocument),
}

impl FinancialRecord {
    /// Shape name, used in conflict errors and logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FinancialRecord::Transaction(_) => "transaction",
            FinancialRecord::Loan(_) => "loan",
            FinancialRecord::Document(_) => "document",
        }
    }

    /// The linked transaction, if this record is one.
    pub fn as_transaction(&self) -> Option<&FinancialTransaction> {
        match self {
            FinancialRecord::Transaction(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn as_loan(&self) -> Option<&Loan> {
        match self {
            FinancialRecord::Loan(loan) => Some(loan),
            _ => None,
        }
    }

    /// The company this record belongs to. Loans span two companies, so they
    /// have no single owner here.
    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            FinancialRecord::Transaction(tx) => Some(tx.company_id),
            FinancialRecord::Loan(_) => None,
            FinancialRecord::Document(doc) => Some(doc.company_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoanStatus, PaymentMethod, TransactionCategory, TransactionType};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn sample_transaction(company_id: Uuid) -> FinancialTransaction {
        let now = Utc::now();
        FinancialTransaction {
            id: Uuid::new_v4(),
            company_id,
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Other,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            description: "Invoice".to_string(),
            entity_name: "Vendor".to_string(),
            total_amount: Decimal::from(100),
            amount_net: Decimal::from(100),
            vat_amount: None,
            vat_rate: None,
            payment_method: PaymentMethod::BankTransfer,
            invoice_number: None,
            notes: None,
            project_id: None,
            bank_account_id: None,
            source_file_id: None,
            invoice_file_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_kind_name_and_company() {
        let company_id = Uuid::new_v4();
        let record = FinancialRecord::Transaction(sample_transaction(company_id));
        assert_eq!(record.kind_name(), "transaction");
        assert_eq!(record.company_id(), Some(company_id));
        assert!(record.as_transaction().is_some());
        assert!(record.as_loan().is_none());
    }

    #[test]
    fn test_loan_record_has_no_single_company() {
        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4(),
            lending_company_id: Uuid::new_v4(),
            borrowing_company_id: Uuid::new_v4(),
            amount: Decimal::from(1000),
            interest_rate: None,
            monthly_payment: None,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: None,
            status: LoanStatus::Active,
            description: None,
            source_file_id: None,
            created_at: now,
            updated_at: now,
        };
        let record = FinancialRecord::Loan(loan);
        assert_eq!(record.kind_name(), "loan");
        assert_eq!(record.company_id(), None);
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let record = FinancialRecord::Transaction(sample_transaction(Uuid::new_v4()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("transaction"));
    }
}
