//! Pure planning logic for completion: reference dates, target companies,
//! and the decision checkpoint. Kept free of I/O so the rules are testable
//! on their own.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use findesk_core::models::{
    FinancialRecord, FinancialTransaction, LoanDraft, WorkflowFile, DOCUMENT_TYPE_LOAN,
};

/// Why completion cannot proceed without an explicit user decision.
/// This is a checkpoint, not an error: the caller offers exactly three
/// outcomes (complete without a record, register a payment first, cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The file has no linked financial record at all.
    NoFinancialRecord,
    /// The linked transaction has a zero amount.
    ZeroAmountTransaction,
}

/// One archive destination for the file's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub company_id: Uuid,
    /// Document type stamped on the inserted record. The primary destination
    /// carries the file's workflow category; loan copies are tagged "Loan";
    /// the secondary (paying company) copy carries none.
    pub document_type: Option<String>,
}

/// The reference date completion files under: the linked transaction's date
/// when one exists, the upload timestamp otherwise.
pub fn reference_date(
    file: &WorkflowFile,
    transaction: Option<&FinancialTransaction>,
) -> NaiveDate {
    transaction
        .map(|tx| tx.date)
        .unwrap_or_else(|| file.created_at.date_naive())
}

/// Calendar (year, month) used for the storage-location lookup.
pub fn year_month(date: NaiveDate) -> (i32, i32) {
    (date.year(), date.month() as i32)
}

/// Whether completion must stop at the interactive checkpoint.
///
/// A queued loan draft short-circuits the checkpoint: the draft is the
/// financial record. Loan and document records are complete in themselves;
/// only an absent record or a zero-amount transaction requires a decision.
pub fn required_decision(
    record: Option<&FinancialRecord>,
    draft: Option<&LoanDraft>,
) -> Option<DecisionReason> {
    if draft.is_some() {
        return None;
    }
    match record {
        None => Some(DecisionReason::NoFinancialRecord),
        Some(FinancialRecord::Transaction(tx)) if tx.is_zero_amount() => {
            Some(DecisionReason::ZeroAmountTransaction)
        }
        Some(_) => None,
    }
}

/// Destinations for a transaction-linked file: the transaction's company,
/// plus the paying bank account's owner when that is a different company
/// (one company paying on behalf of another).
pub fn transaction_destinations(
    file: &WorkflowFile,
    transaction: &FinancialTransaction,
    bank_account_company: Option<Uuid>,
) -> Vec<Destination> {
    let mut destinations = vec![Destination {
        company_id: transaction.company_id,
        document_type: file.category.clone(),
    }];
    if let Some(payer) = bank_account_company {
        if payer != transaction.company_id {
            destinations.push(Destination {
                company_id: payer,
                document_type: None,
            });
        }
    }
    destinations
}

/// Destinations for a loan: one copy each for lender and borrower, both
/// tagged as loan documents.
pub fn loan_destinations(lending_company_id: Uuid, borrowing_company_id: Uuid) -> Vec<Destination> {
    vec![
        Destination {
            company_id: lending_company_id,
            document_type: Some(DOCUMENT_TYPE_LOAN.to_string()),
        },
        Destination {
            company_id: borrowing_company_id,
            document_type: Some(DOCUMENT_TYPE_LOAN.to_string()),
        },
    ]
}

/// Destination for a file completed without any financial record: the
/// configured default company only.
pub fn fallback_destination(file: &WorkflowFile, default_company_id: Uuid) -> Vec<Destination> {
    vec![Destination {
        company_id: default_company_id,
        document_type: file.category.clone(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use findesk_core::models::{
        CompanyDocument, Loan, LoanDraftStatus, LoanStatus, PaymentMethod, TransactionCategory,
        TransactionType,
    };
    use rust_decimal::Decimal;

    fn sample_file() -> WorkflowFile {
        let uploaded = Utc.with_ymd_and_hms(2025, 6, 18, 9, 30, 0).unwrap();
        WorkflowFile {
            id: Uuid::new_v4(),
            file_name: "invoice.pdf".to_string(),
            file_key: "inbox/1_invoice.pdf".to_string(),
            file_url: "http://localhost:4000/files/inbox/1_invoice.pdf".to_string(),
            file_size: Some(1024),
            mime_type: Some("application/pdf".to_string()),
            status: "Pending".to_string(),
            notes: None,
            priority: "normal".to_string(),
            category: Some("Invoices".to_string()),
            company_id: None,
            created_at: uploaded,
            completed_at: None,
            updated_at: uploaded,
        }
    }

    fn sample_transaction(company_id: Uuid, amount: Decimal) -> FinancialTransaction {
        let now = Utc::now();
        FinancialTransaction {
            id: Uuid::new_v4(),
            company_id,
            transaction_type: TransactionType::Expense,
            category: TransactionCategory::Other,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            description: "Invoice".to_string(),
            entity_name: "Vendor".to_string(),
            total_amount: amount,
            amount_net: amount,
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

    fn sample_draft(file_id: Uuid) -> LoanDraft {
        let now = Utc::now();
        LoanDraft {
            file_id,
            status: LoanDraftStatus::Drafted,
            lending_company_id: Uuid::new_v4(),
            borrowing_company_id: Uuid::new_v4(),
            amount: Decimal::from(1000),
            interest_rate: None,
            monthly_payment: None,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reference_date_prefers_transaction() {
        let file = sample_file();
        let tx = sample_transaction(Uuid::new_v4(), Decimal::from(100));
        assert_eq!(
            reference_date(&file, Some(&tx)),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_reference_date_falls_back_to_upload() {
        let file = sample_file();
        assert_eq!(
            reference_date(&file, None),
            NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
        );
    }

    #[test]
    fn test_year_month() {
        assert_eq!(
            year_month(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
            (2025, 3)
        );
    }

    #[test]
    fn test_decision_required_without_record() {
        assert_eq!(
            required_decision(None, None),
            Some(DecisionReason::NoFinancialRecord)
        );
    }

    #[test]
    fn test_decision_required_for_zero_amount() {
        let record =
            FinancialRecord::Transaction(sample_transaction(Uuid::new_v4(), Decimal::ZERO));
        assert_eq!(
            required_decision(Some(&record), None),
            Some(DecisionReason::ZeroAmountTransaction)
        );
    }

    #[test]
    fn test_no_decision_for_normal_transaction() {
        let record =
            FinancialRecord::Transaction(sample_transaction(Uuid::new_v4(), Decimal::from(50)));
        assert_eq!(required_decision(Some(&record), None), None);
    }

    #[test]
    fn test_draft_short_circuits_decision() {
        let draft = sample_draft(Uuid::new_v4());
        assert_eq!(required_decision(None, Some(&draft)), None);
    }

    #[test]
    fn test_no_decision_for_loan_or_document_records() {
        let now = Utc::now();
        let loan = FinancialRecord::Loan(Loan {
            id: Uuid::new_v4(),
            lending_company_id: Uuid::new_v4(),
            borrowing_company_id: Uuid::new_v4(),
            amount: Decimal::from(1000),
            interest_rate: None,
            monthly_payment: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            status: LoanStatus::Active,
            description: None,
            source_file_id: None,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(required_decision(Some(&loan), None), None);

        let doc = FinancialRecord::Document(CompanyDocument {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            folder_id: None,
            name: "contract.pdf".to_string(),
            file_key: "archive/x/1_contract.pdf".to_string(),
            file_url: "http://localhost/files/archive/x/1_contract.pdf".to_string(),
            file_size: None,
            mime_type: None,
            document_type: None,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(required_decision(Some(&doc), None), None);
    }

    #[test]
    fn test_transaction_destinations_single() {
        let file = sample_file();
        let company = Uuid::new_v4();
        let tx = sample_transaction(company, Decimal::from(100));
        let destinations = transaction_destinations(&file, &tx, None);
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].company_id, company);
        assert_eq!(destinations[0].document_type.as_deref(), Some("Invoices"));
    }

    #[test]
    fn test_transaction_destinations_same_payer_not_duplicated() {
        let file = sample_file();
        let company = Uuid::new_v4();
        let tx = sample_transaction(company, Decimal::from(100));
        let destinations = transaction_destinations(&file, &tx, Some(company));
        assert_eq!(destinations.len(), 1);
    }

    #[test]
    fn test_transaction_destinations_dual_company() {
        let file = sample_file();
        let company = Uuid::new_v4();
        let payer = Uuid::new_v4();
        let tx = sample_transaction(company, Decimal::from(100));
        let destinations = transaction_destinations(&file, &tx, Some(payer));
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].company_id, company);
        assert_eq!(destinations[0].document_type.as_deref(), Some("Invoices"));
        assert_eq!(destinations[1].company_id, payer);
        assert_eq!(destinations[1].document_type, None);
    }

    #[test]
    fn test_loan_destinations() {
        let lender = Uuid::new_v4();
        let borrower = Uuid::new_v4();
        let destinations = loan_destinations(lender, borrower);
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].company_id, lender);
        assert_eq!(destinations[1].company_id, borrower);
        assert!(destinations
            .iter()
            .all(|d| d.document_type.as_deref() == Some("Loan")));
    }

    #[test]
    fn test_fallback_destination_uses_default_company() {
        let file = sample_file();
        let default_company = Uuid::new_v4();
        let destinations = fallback_destination(&file, default_company);
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].company_id, default_company);
        assert_eq!(destinations[0].document_type.as_deref(), Some("Invoices"));
    }
}
