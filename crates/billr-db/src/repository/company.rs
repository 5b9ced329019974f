//! # Company Repository
//!
//! The account's letterhead: name, address, GSTIN, phones and the bank
//! accounts printed on every invoice. One row per tenant.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{json_from_sql, json_to_sql};
use billr_core::validation::{validate_bank_account, validate_gstin, validate_name};
use billr_core::{BankAccount, Company};

const ENTITY: &str = "Company";

/// Repository for the company profile.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    tenant_id: String,
    company_name: String,
    company_type: String,
    company_address: String,
    gstin: String,
    phone1: String,
    phone2: Option<String>,
    bank_accounts: String,
}

impl TryFrom<CompanyRow> for Company {
    type Error = crate::error::DbError;

    fn try_from(row: CompanyRow) -> DbResult<Self> {
        let bank_accounts: Vec<BankAccount> =
            json_from_sql(ENTITY, "bank_accounts", &row.bank_accounts)?;

        Ok(Company {
            tenant_id: row.tenant_id,
            company_name: row.company_name,
            company_type: row.company_type,
            company_address: row.company_address,
            gstin: row.gstin,
            phone1: row.phone1,
            phone2: row.phone2,
            bank_accounts,
        })
    }
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Creates or replaces the tenant's profile.
    ///
    /// ## Validation
    /// - Company name is required
    /// - GSTIN must be well formed
    /// - Every bank account needs a name, digits-only number and valid IFSC
    pub async fn upsert(&self, company: &Company, now: DateTime<Utc>) -> DbResult<()> {
        validate_name("company name", &company.company_name)?;
        validate_gstin(&company.gstin)?;
        for account in &company.bank_accounts {
            validate_bank_account(account)?;
        }

        debug!(
            tenant_id = %company.tenant_id,
            banks = company.bank_accounts.len(),
            "Upserting company profile"
        );

        let bank_accounts = json_to_sql(ENTITY, &company.bank_accounts)?;
        let phone2 = company
            .phone2
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        sqlx::query(
            r#"
            INSERT INTO companies (
                tenant_id, company_name, company_type, company_address,
                gstin, phone1, phone2, bank_accounts, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            ON CONFLICT (tenant_id) DO UPDATE SET
                company_name    = excluded.company_name,
                company_type    = excluded.company_type,
                company_address = excluded.company_address,
                gstin           = excluded.gstin,
                phone1          = excluded.phone1,
                phone2          = excluded.phone2,
                bank_accounts   = excluded.bank_accounts,
                updated_at      = excluded.updated_at
            "#,
        )
        .bind(&company.tenant_id)
        .bind(company.company_name.trim())
        .bind(company.company_type.trim())
        .bind(company.company_address.trim())
        .bind(company.gstin.trim())
        .bind(company.phone1.trim())
        .bind(phone2)
        .bind(bank_accounts)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the tenant's profile, if one was saved.
    pub async fn get(&self, tenant_id: &str) -> DbResult<Option<Company>> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"
            SELECT
                tenant_id, company_name, company_type, company_address,
                gstin, phone1, phone2, bank_accounts
            FROM companies
            WHERE tenant_id = ?1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Company::try_from).transpose()
    }

    /// Gets the tenant's profile, or the stock letterhead when none exists.
    pub async fn get_or_fallback(&self, tenant_id: &str) -> DbResult<Company> {
        match self.get(tenant_id).await? {
            Some(company) => Ok(company),
            None => {
                debug!(tenant_id = %tenant_id, "No company profile, using fallback");
                Ok(Company::fallback(tenant_id))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::fixtures::{database, OTHER_TENANT, TENANT};
    use billr_core::{CoreError, ValidationError};

    fn company() -> Company {
        Company {
            tenant_id: TENANT.to_string(),
            company_name: "Gupta Fabrics".to_string(),
            company_type: "WHOLESALE CLOTH".to_string(),
            company_address: "Kinari Bazaar, Agra".to_string(),
            gstin: "09ABCDE1234F1Z5".to_string(),
            phone1: "9411000000".to_string(),
            phone2: Some("  ".to_string()),
            bank_accounts: vec![BankAccount::new("State Bank of India", "12345678901", "SBIN0001234")],
        }
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let db = database().await;
        let repo = db.companies();

        repo.upsert(&company(), Utc::now()).await.unwrap();
        let stored = repo.get(TENANT).await.unwrap().unwrap();

        assert_eq!(stored.company_name, "Gupta Fabrics");
        assert_eq!(stored.phone2, None);
        assert_eq!(stored.bank_accounts.len(), 1);
        assert_eq!(stored.bank_accounts[0].ifsc_code, "SBIN0001234");

        let mut updated = company();
        updated.company_name = "Gupta Fabrics & Sons".to_string();
        updated.bank_accounts.clear();
        repo.upsert(&updated, Utc::now()).await.unwrap();

        let stored = repo.get(TENANT).await.unwrap().unwrap();
        assert_eq!(stored.company_name, "Gupta Fabrics & Sons");
        assert!(stored.bank_accounts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_profile_falls_back() {
        let db = database().await;
        let repo = db.companies();

        repo.upsert(&company(), Utc::now()).await.unwrap();

        assert!(repo.get(OTHER_TENANT).await.unwrap().is_none());
        let fallback = repo.get_or_fallback(OTHER_TENANT).await.unwrap();
        assert_eq!(fallback.tenant_id, OTHER_TENANT);
        assert_eq!(fallback.gstin, Company::fallback(OTHER_TENANT).gstin);
    }

    #[tokio::test]
    async fn test_rejects_invalid_profile() {
        let db = database().await;
        let repo = db.companies();

        let mut bad_gstin = company();
        bad_gstin.gstin = "NOT-A-GSTIN".to_string();
        assert!(matches!(
            repo.upsert(&bad_gstin, Utc::now()).await,
            Err(DbError::Core(CoreError::Validation(ValidationError::InvalidFormat { .. })))
        ));

        let mut bad_ifsc = company();
        bad_ifsc.bank_accounts = vec![BankAccount::new("HDFC Bank", "5010001", "HDFC1234567")];
        assert!(repo.upsert(&bad_ifsc, Utc::now()).await.is_err());

        assert!(repo.get(TENANT).await.unwrap().is_none());
    }
}
