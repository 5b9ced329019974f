//! # Repository Module
//!
//! Database repository implementations for CloudBillr.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Request handler                                                       │
//! │       │                                                                 │
//! │       │  db.invoices().create(tenant, customer_id, input, now)         │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── next_invoice_number(&self, tenant, year)                          │
//! │  ├── create / insert / get / list                                      │
//! │  ├── attach_eway_bill(&self, tenant, id, number)                       │
//! │  └── list_between / broker_ledger                                      │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked), rows mapped via FromRow                │
//! │       ▼                                                                 │
//! │  *Row struct ──TryFrom──► billr-core domain type                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is scoped by `tenant_id`; a row owned by another account is
//! indistinguishable from a missing one.
//!
//! ## Available Repositories
//!
//! - [`CompanyRepository`](company::CompanyRepository) - Letterhead profile
//! - [`CustomerRepository`](customer::CustomerRepository) - Recipients
//! - [`ProductRepository`](product::ProductRepository) - Catalog
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices and reports

pub mod company;
pub mod customer;
pub mod invoice;
pub mod product;

use std::str::FromStr;

use billr_core::Money;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DbError, DbResult};

// =============================================================================
// Column Codecs
// =============================================================================

/// Money column as stored: the exact decimal, no forced scale.
pub(crate) fn money_to_sql(money: Money) -> String {
    money.amount().to_string()
}

pub(crate) fn money_from_sql(entity: &str, column: &str, raw: &str) -> DbResult<Money> {
    Decimal::from_str(raw)
        .map(Money::new)
        .map_err(|e| DbError::corrupt(entity, format!("{}: {}", column, e)))
}

pub(crate) fn json_to_sql<T: Serialize + ?Sized>(entity: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::corrupt(entity, e))
}

pub(crate) fn json_from_sql<T: DeserializeOwned>(entity: &str, column: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::corrupt(entity, format!("{}: {}", column, e)))
}

/// Narrows a stored INTEGER percentage back to `u8`.
pub(crate) fn percent_from_sql(entity: &str, column: &str, raw: i64) -> DbResult<u8> {
    u8::try_from(raw).map_err(|_| DbError::corrupt(entity, format!("{}: {} out of range", column, raw)))
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use billr_core::{Customer, GstRate, LineItem, Money};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::pool::{Database, DbConfig};

    pub const TENANT: &str = "tenant-agra";
    pub const OTHER_TENANT: &str = "tenant-surat";

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn customer(tenant_id: &str, name: &str, gst_number: Option<&str>) -> Customer {
        Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            business_name: name.to_string(),
            contact_person: Some("Ramesh Gupta".to_string()),
            phone: Some("9876543210".to_string()),
            address: "Raja Ki Mandi".to_string(),
            city: "Agra".to_string(),
            state: "Uttar Pradesh".to_string(),
            gst_number: gst_number.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    pub fn item(name: &str, quantity: i64, rate: i64, gst_rate: GstRate) -> LineItem {
        LineItem {
            product_name: name.to_string(),
            hsn_code: "5208".to_string(),
            unit: "Pcs".to_string(),
            quantity: Decimal::from(quantity),
            rate: Money::from_rupees(rate),
            gst_rate,
        }
    }
}
