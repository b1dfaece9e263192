//! Company and bank account repositories.

use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use findesk_core::models::{BankAccount, BankAccountType, Company};
use findesk_core::AppError;

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies"))]
    pub async fn create(&self, name: &str, tax_id: Option<&str>) -> Result<Company, AppError> {
        let now = Utc::now();
        let company = sqlx::query_as::<Postgres, Company>(
            r#"
            INSERT INTO companies (name, tax_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, name, tax_id, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(tax_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(company)
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<Postgres, Company>(
            "SELECT id, name, tax_id, created_at, updated_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    /// Company name for user-facing messages; falls back to the id when the
    /// row is missing so errors still name the company.
    pub async fn display_name(&self, id: Uuid) -> Result<String, AppError> {
        Ok(self
            .get(id)
            .await?
            .map(|c| c.name)
            .unwrap_or_else(|| id.to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "companies"))]
    pub async fn list(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<Postgres, Company>(
            "SELECT id, name, tax_id, created_at, updated_at FROM companies ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }
}

#[derive(Clone)]
pub struct BankAccountRepository {
    pool: PgPool,
}

impl BankAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "bank_accounts"))]
    pub async fn create(
        &self,
        company_id: Uuid,
        account_name: &str,
        account_type: BankAccountType,
    ) -> Result<BankAccount, AppError> {
        let now = Utc::now();
        let account = sqlx::query_as::<Postgres, BankAccount>(
            r#"
            INSERT INTO bank_accounts (company_id, account_name, account_type, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, true, $4, $4)
            RETURNING id, company_id, account_name, account_type, is_active, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(account_name)
        .bind(account_type)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bank_accounts", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<BankAccount>, AppError> {
        let account = sqlx::query_as::<Postgres, BankAccount>(
            "SELECT id, company_id, account_name, account_type, is_active, created_at, updated_at \
             FROM bank_accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bank_accounts"))]
    pub async fn list_active(&self) -> Result<Vec<BankAccount>, AppError> {
        let accounts = sqlx::query_as::<Postgres, BankAccount>(
            "SELECT id, company_id, account_name, account_type, is_active, created_at, updated_at \
             FROM bank_accounts WHERE is_active = true ORDER BY company_id, account_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }
}
