//! # Customer Repository
//!
//! Invoice recipients. A GSTIN identifies a registered business, so one
//! account cannot hold two customers with the same GSTIN. Unregistered
//! buyers (no GSTIN) are unrestricted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use billr_core::validation::{validate_name, validate_optional_gstin};
use billr_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    tenant_id: String,
    business_name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    address: String,
    city: String,
    state: String,
    gst_number: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            tenant_id: row.tenant_id,
            business_name: row.business_name,
            contact_person: row.contact_person,
            phone: row.phone,
            address: row.address,
            city: row.city,
            state: row.state,
            gst_number: row.gst_number,
            created_at: row.created_at,
        }
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// The customer as stored (trimmed, blank optionals dropped).
    ///
    /// ## Errors
    /// - `DbError::Core` when the name is missing or the GSTIN is malformed
    /// - `DbError::UniqueViolation` when the account already has a customer
    ///   with this GSTIN
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        validate_name("business name", &customer.business_name)?;
        let gst_number = validate_optional_gstin(customer.gst_number.as_deref())?;

        let stored = Customer {
            id: customer.id.clone(),
            tenant_id: customer.tenant_id.clone(),
            business_name: customer.business_name.trim().to_string(),
            contact_person: blank_to_none(customer.contact_person.as_deref()),
            phone: blank_to_none(customer.phone.as_deref()),
            address: customer.address.trim().to_string(),
            city: customer.city.trim().to_string(),
            state: customer.state.trim().to_string(),
            gst_number,
            created_at: customer.created_at,
        };

        debug!(
            tenant_id = %stored.tenant_id,
            customer_id = %stored.id,
            "Inserting customer"
        );

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, tenant_id, business_name, contact_person, phone,
                address, city, state, gst_number, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.tenant_id)
        .bind(&stored.business_name)
        .bind(&stored.contact_person)
        .bind(&stored.phone)
        .bind(&stored.address)
        .bind(&stored.city)
        .bind(&stored.state)
        .bind(&stored.gst_number)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.contains("gst_number") => {
                DbError::duplicate("gst_number", stored.gst_number.clone().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(stored)
    }

    /// Gets a customer of this account by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - No such customer in this account
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                id, tenant_id, business_name, contact_person, phone,
                address, city, state, gst_number, created_at
            FROM customers
            WHERE tenant_id = ?1 AND id = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Lists the account's customers alphabetically.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                id, tenant_id, business_name, contact_person, phone,
                address, city, state, gst_number, created_at
            FROM customers
            WHERE tenant_id = ?1
            ORDER BY business_name COLLATE NOCASE, created_at
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, count = rows.len(), "Listed customers");
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Number of customers in the account.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{customer, database, OTHER_TENANT, TENANT};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = database().await;
        let repo = db.customers();

        let mut input = customer(TENANT, "  Gupta Textiles ", Some(" 09ABCDE1234F1Z5 "));
        input.phone = Some(" ".to_string());
        let stored = repo.insert(&input).await.unwrap();

        assert_eq!(stored.business_name, "Gupta Textiles");
        assert_eq!(stored.gst_number.as_deref(), Some("09ABCDE1234F1Z5"));
        assert_eq!(stored.phone, None);

        let fetched = repo.get(TENANT, &stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.business_name, "Gupta Textiles");
        assert_eq!(fetched.contact_person.as_deref(), Some("Ramesh Gupta"));
        assert_eq!(fetched.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn test_get_is_tenant_scoped() {
        let db = database().await;
        let repo = db.customers();

        let stored = repo
            .insert(&customer(TENANT, "Gupta Textiles", None))
            .await
            .unwrap();

        assert!(repo.get(OTHER_TENANT, &stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_gstin_rejected_per_tenant() {
        let db = database().await;
        let repo = db.customers();
        let gstin = Some("09ABCDE1234F1Z5");

        repo.insert(&customer(TENANT, "Gupta Textiles", gstin))
            .await
            .unwrap();

        let err = repo
            .insert(&customer(TENANT, "Gupta Textiles (Branch)", gstin))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "gst_number");
                assert_eq!(value, "09ABCDE1234F1Z5");
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }

        // Another account may hold the same GSTIN
        repo.insert(&customer(OTHER_TENANT, "Gupta Textiles", gstin))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unregistered_buyers_never_collide() {
        let db = database().await;
        let repo = db.customers();

        repo.insert(&customer(TENANT, "Walk-in A", None)).await.unwrap();
        repo.insert(&customer(TENANT, "Walk-in B", Some(""))).await.unwrap();

        assert_eq!(repo.count(TENANT).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = database().await;
        let repo = db.customers();

        for name in ["sharma cloth house", "Agarwal Sarees", "Mehta Traders"] {
            repo.insert(&customer(TENANT, name, None)).await.unwrap();
        }
        repo.insert(&customer(OTHER_TENANT, "Surat Silks", None))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list(TENANT)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.business_name)
            .collect();
        assert_eq!(names, vec!["Agarwal Sarees", "Mehta Traders", "sharma cloth house"]);
    }

    #[tokio::test]
    async fn test_invalid_customer_rejected() {
        let db = database().await;
        let repo = db.customers();

        assert!(repo.insert(&customer(TENANT, "   ", None)).await.is_err());
        assert!(repo
            .insert(&customer(TENANT, "Gupta Textiles", Some("09ABCDE")))
            .await
            .is_err());
        assert_eq!(repo.count(TENANT).await.unwrap(), 0);
    }
}
