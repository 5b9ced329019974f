//! # Invoice Repository
//!
//! Database operations for invoices and the reports built on them.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. NUMBER                                                             │
//! │     └── next_invoice_number() → "INV-2025-0042" (form prefill)         │
//! │                                                                         │
//! │  2. CREATE                                                             │
//! │     └── create() → load customer (same account)                        │
//! │                  → Invoice::create (validate + compute totals)         │
//! │                  → insert (totals frozen)                              │
//! │                                                                         │
//! │  3. (OPTIONAL) E-WAY BILL                                              │
//! │     └── attach_eway_bill() → only mutation after creation              │
//! │                                                                         │
//! │  4. REPORT                                                             │
//! │     └── list_between() / invoice_report_csv() / broker_ledger()        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::{json_from_sql, json_to_sql, money_from_sql, money_to_sql, percent_from_sql};
use billr_core::ledger::{invoice_report_csv, summarize_by_broker, year_range};
use billr_core::{
    next_invoice_number, BrokerSummary, DiscountRate, Invoice, LineItem, NewInvoice, TaxBreakdown,
};

const ENTITY: &str = "Invoice";

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, tenant_id, invoice_number, invoice_date, customer_id, customer_name,
        broker_name, eway_bill_number, items, is_same_state,
        subtotal, discount_rate, discount, taxable_amount, gst_amount,
        cgst, sgst, igst, round_off, total_amount,
        created_at, updated_at
    FROM invoices
"#;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    tenant_id: String,
    invoice_number: String,
    invoice_date: NaiveDate,
    customer_id: String,
    customer_name: String,
    broker_name: Option<String>,
    eway_bill_number: Option<String>,
    items: String,
    is_same_state: bool,
    subtotal: String,
    discount_rate: i64,
    discount: String,
    taxable_amount: String,
    gst_amount: String,
    cgst: String,
    sgst: String,
    igst: String,
    round_off: String,
    total_amount: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DbError;

    fn try_from(row: InvoiceRow) -> DbResult<Self> {
        let items: Vec<LineItem> = json_from_sql(ENTITY, "items", &row.items)?;
        let discount_rate =
            DiscountRate::new(percent_from_sql(ENTITY, "discount_rate", row.discount_rate)?)
                .map_err(|e| DbError::corrupt(ENTITY, e))?;

        let totals = TaxBreakdown {
            subtotal: money_from_sql(ENTITY, "subtotal", &row.subtotal)?,
            discount_rate,
            discount: money_from_sql(ENTITY, "discount", &row.discount)?,
            taxable_amount: money_from_sql(ENTITY, "taxable_amount", &row.taxable_amount)?,
            gst_amount: money_from_sql(ENTITY, "gst_amount", &row.gst_amount)?,
            cgst: money_from_sql(ENTITY, "cgst", &row.cgst)?,
            sgst: money_from_sql(ENTITY, "sgst", &row.sgst)?,
            igst: money_from_sql(ENTITY, "igst", &row.igst)?,
            round_off: money_from_sql(ENTITY, "round_off", &row.round_off)?,
            total_amount: money_from_sql(ENTITY, "total_amount", &row.total_amount)?,
        };

        Ok(Invoice {
            id: row.id,
            tenant_id: row.tenant_id,
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            broker_name: row.broker_name,
            eway_bill_number: row.eway_bill_number,
            items,
            is_same_state: row.is_same_state,
            totals,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Numbering
    // =========================================================================

    /// Number of invoices the account has ever issued.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Suggests the next invoice number for the account.
    ///
    /// The sequence counts every invoice of the account, not only those of
    /// `year`, so numbers keep growing across year boundaries.
    pub async fn next_invoice_number(&self, tenant_id: &str, year: i32) -> DbResult<String> {
        let count = self.count(tenant_id).await?;
        let number = next_invoice_number(year, count.max(0) as u64);

        debug!(tenant_id = %tenant_id, number = %number, "Next invoice number");
        Ok(number)
    }

    // =========================================================================
    // Create / Insert
    // =========================================================================

    /// Validates, computes and stores a new invoice.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the customer is not in this account
    /// - `DbError::Core` for validation failures and empty invoices
    /// - `DbError::UniqueViolation` when the invoice number is taken
    pub async fn create(
        &self,
        tenant_id: &str,
        customer_id: &str,
        input: NewInvoice,
        now: DateTime<Utc>,
    ) -> DbResult<Invoice> {
        let customer = CustomerRepository::new(self.pool.clone())
            .get(tenant_id, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        let invoice = Invoice::create(tenant_id, &customer, input, now)?;
        self.insert(&invoice).await?;

        info!(
            tenant_id = %tenant_id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.totals.total_amount,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Stores an already-computed invoice.
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(
            tenant_id = %invoice.tenant_id,
            invoice_number = %invoice.invoice_number,
            items = invoice.items.len(),
            "Inserting invoice"
        );

        let items = json_to_sql(ENTITY, &invoice.items)?;
        let totals = &invoice.totals;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, tenant_id, invoice_number, invoice_date, customer_id, customer_name,
                broker_name, eway_bill_number, items, is_same_state,
                subtotal, discount_rate, discount, taxable_amount, gst_amount,
                cgst, sgst, igst, round_off, total_amount,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                ?21, ?22
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.tenant_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.invoice_date)
        .bind(&invoice.customer_id)
        .bind(&invoice.customer_name)
        .bind(&invoice.broker_name)
        .bind(&invoice.eway_bill_number)
        .bind(items)
        .bind(invoice.is_same_state)
        .bind(money_to_sql(totals.subtotal))
        .bind(i64::from(totals.discount_rate.percent()))
        .bind(money_to_sql(totals.discount))
        .bind(money_to_sql(totals.taxable_amount))
        .bind(money_to_sql(totals.gst_amount))
        .bind(money_to_sql(totals.cgst))
        .bind(money_to_sql(totals.sgst))
        .bind(money_to_sql(totals.igst))
        .bind(money_to_sql(totals.round_off))
        .bind(money_to_sql(totals.total_amount))
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.contains("invoice_number") => {
                DbError::duplicate("invoice_number", invoice.invoice_number.clone())
            }
            other => other,
        })?;

        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an invoice of this account by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Invoice>> {
        let row: Option<InvoiceRow> =
            sqlx::query_as(&format!("{} WHERE tenant_id = ?1 AND id = ?2", SELECT_COLUMNS))
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Lists the account's invoices, newest first.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "{} WHERE tenant_id = ?1 ORDER BY invoice_date DESC, created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(tenant_id = %tenant_id, count = rows.len(), "Listed invoices");
        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// Invoices dated within `[start, end]` (both inclusive), oldest first.
    pub async fn list_between(
        &self,
        tenant_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "{} WHERE tenant_id = ?1 AND invoice_date >= ?2 AND invoice_date <= ?3 \
             ORDER BY invoice_date, created_at",
            SELECT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            tenant_id = %tenant_id,
            start = %start,
            end = %end,
            count = rows.len(),
            "Listed invoices in range"
        );
        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// The accountant's CSV for invoices dated within `[start, end]`.
    pub async fn invoice_report(
        &self,
        tenant_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<String> {
        let invoices = self.list_between(tenant_id, start, end).await?;
        Ok(invoice_report_csv(&invoices, start, end)?)
    }

    /// Per-broker totals for one calendar year.
    pub async fn broker_ledger(&self, tenant_id: &str, year: i32) -> DbResult<Vec<BrokerSummary>> {
        let (start, end) = year_range(year)
            .and_then(|(start, next_year)| Some((start, next_year.pred_opt()?)))
            .ok_or_else(|| DbError::QueryFailed(format!("year {} out of range", year)))?;

        let invoices = self.list_between(tenant_id, start, end).await?;
        Ok(summarize_by_broker(&invoices))
    }

    // =========================================================================
    // E-Way Bill
    // =========================================================================

    /// Attaches (or replaces) the e-way bill number on an invoice.
    ///
    /// Scoped to the account: an invoice of another account is reported as
    /// not found and left untouched.
    pub async fn attach_eway_bill(
        &self,
        tenant_id: &str,
        id: &str,
        number: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Invoice> {
        let mut invoice = self
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;

        invoice.attach_eway_bill(number, now)?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET eway_bill_number = ?1, updated_at = ?2
            WHERE tenant_id = ?3 AND id = ?4
            "#,
        )
        .bind(&invoice.eway_bill_number)
        .bind(invoice.updated_at)
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        info!(
            tenant_id = %tenant_id,
            invoice_number = %invoice.invoice_number,
            "E-way bill attached"
        );

        Ok(invoice)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
