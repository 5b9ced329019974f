//! # Invoice Lifecycle
//!
//! Creating an invoice computes its totals exactly once. After that the only
//! permitted change is attaching an e-way bill number.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NewInvoice (form input)                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Invoice::create ── validate ── calculate ──► Invoice (totals frozen) │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                                     attach_eway_bill (may repeat)      │
//! │                                                    │                    │
//! │                                                    ▼                    │
//! │                                     render (reads stored fields only)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::calculator::calculate;
use crate::error::{CoreError, CoreResult};
use crate::types::{Customer, DiscountRate, LineItem, TaxBreakdown, TaxMode};
use crate::validation::{
    validate_eway_bill, validate_invoice_number, validate_line_items, ValidationResult,
};

// =============================================================================
// Input
// =============================================================================

/// Invoice form input, before totals are computed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewInvoice {
    pub invoice_number: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub broker_name: Option<String>,
    #[serde(default)]
    pub eway_bill_number: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub discount_rate: DiscountRate,
    pub is_same_state: bool,
}

// =============================================================================
// Invoice
// =============================================================================

/// A stored invoice with its frozen tax breakdown.
///
/// Serializes flat: the breakdown fields (`subtotal`, `cgst`, ...) sit next
/// to `invoiceNumber` in the JSON.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub tenant_id: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub customer_id: String,
    /// Customer name at the time of invoicing.
    pub customer_name: String,
    pub broker_name: Option<String>,
    pub eway_bill_number: Option<String>,
    pub items: Vec<LineItem>,
    pub is_same_state: bool,
    #[serde(flatten)]
    pub totals: TaxBreakdown,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Validates the form input and freezes the computed totals.
    ///
    /// ## Errors
    /// - [`CoreError::ForeignCustomer`] when the customer belongs to another
    ///   account
    /// - [`CoreError::EmptyInvoice`] when there are no line items
    /// - [`CoreError::Validation`] for any malformed field
    ///
    /// ## Example
    /// ```rust
    /// use billr_core::invoice::{Invoice, NewInvoice};
    /// use billr_core::{Customer, DiscountRate, GstRate, LineItem, Money};
    /// use chrono::{NaiveDate, Utc};
    /// use rust_decimal::Decimal;
    ///
    /// let customer = Customer {
    ///     id: "c-1".to_string(),
    ///     tenant_id: "t-1".to_string(),
    ///     business_name: "Gupta Textiles".to_string(),
    ///     contact_person: None,
    ///     phone: None,
    ///     address: "Raja Ki Mandi".to_string(),
    ///     city: "Agra".to_string(),
    ///     state: "Uttar Pradesh".to_string(),
    ///     gst_number: None,
    ///     created_at: Utc::now(),
    /// };
    /// let input = NewInvoice {
    ///     invoice_number: "INV-2025-0001".to_string(),
    ///     invoice_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    ///     broker_name: None,
    ///     eway_bill_number: None,
    ///     items: vec![LineItem {
    ///         product_name: "Cotton Shirting".to_string(),
    ///         hsn_code: "5208".to_string(),
    ///         unit: "Pcs".to_string(),
    ///         quantity: Decimal::from(10),
    ///         rate: Money::from_rupees(100),
    ///         gst_rate: GstRate::FIVE,
    ///     }],
    ///     discount_rate: DiscountRate::NONE,
    ///     is_same_state: true,
    /// };
    ///
    /// let invoice = Invoice::create("t-1", &customer, input, Utc::now()).unwrap();
    /// assert_eq!(invoice.totals.total_amount, Money::from_rupees(1050));
    /// ```
    pub fn create(
        tenant_id: &str,
        customer: &Customer,
        input: NewInvoice,
        now: DateTime<Utc>,
    ) -> CoreResult<Invoice> {
        if customer.tenant_id != tenant_id {
            return Err(CoreError::ForeignCustomer {
                customer_id: customer.id.clone(),
                tenant_id: tenant_id.to_string(),
            });
        }

        validate_invoice_number(&input.invoice_number)?;
        let invoice_number = input.invoice_number.trim().to_string();

        if input.items.is_empty() {
            return Err(CoreError::EmptyInvoice { invoice_number });
        }
        validate_line_items(&input.items)?;

        let eway_bill_number = normalize_eway_bill(input.eway_bill_number.as_deref())?;
        let broker_name = input
            .broker_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let totals = calculate(&input.items, input.discount_rate, input.is_same_state);

        Ok(Invoice {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            invoice_number,
            invoice_date: input.invoice_date,
            customer_id: customer.id.clone(),
            customer_name: customer.business_name.clone(),
            broker_name,
            eway_bill_number,
            items: input.items,
            is_same_state: input.is_same_state,
            totals,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attaches (or replaces) the e-way bill number.
    ///
    /// The only mutation an invoice allows. Totals are untouched.
    pub fn attach_eway_bill(&mut self, number: &str, now: DateTime<Utc>) -> CoreResult<()> {
        validate_eway_bill(number)?;
        self.eway_bill_number = Some(number.trim().to_string());
        self.updated_at = now;
        Ok(())
    }

    #[inline]
    pub fn tax_mode(&self) -> TaxMode {
        TaxMode::from_same_state(self.is_same_state)
    }
}

fn normalize_eway_bill(number: Option<&str>) -> ValidationResult<Option<String>> {
    match number.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            validate_eway_bill(value)?;
            Ok(Some(value.to_string()))
        }
    }
}

// =============================================================================
// Numbering
// =============================================================================

/// Next sequential invoice number for an account.
///
/// ```text
/// year 2025, 41 invoices so far ──► "INV-2025-0042"
/// ```
///
/// Counts past 9999 simply grow wider (`INV-2025-10000`).
pub fn next_invoice_number(year: i32, existing_count: u64) -> String {
    format!("INV-{}-{:04}", year, existing_count + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::GstRate;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn customer(tenant_id: &str) -> Customer {
        Customer {
            id: "cust-1".to_string(),
            tenant_id: tenant_id.to_string(),
            business_name: "Agarwal Saree Centre".to_string(),
            contact_person: Some("R. Agarwal".to_string()),
            phone: Some("9837000000".to_string()),
            address: "Kinari Bazaar".to_string(),
            city: "Agra".to_string(),
            state: "Uttar Pradesh".to_string(),
            gst_number: Some("09ABCDE1234F1Z5".to_string()),
            created_at: Utc::now(),
        }
    }

    fn input() -> NewInvoice {
        NewInvoice {
            invoice_number: " INV-2025-0007 ".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
            broker_name: Some("  Mahesh Broker ".to_string()),
            eway_bill_number: Some(String::new()),
            items: vec![LineItem {
                product_name: "Banarasi Saree".to_string(),
                hsn_code: "5007".to_string(),
                unit: "Pcs".to_string(),
                quantity: dec!(10),
                rate: Money::from_rupees(100),
                gst_rate: GstRate::FIVE,
            }],
            discount_rate: DiscountRate::NONE,
            is_same_state: true,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 14, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_create_computes_totals_and_snapshots_customer() {
        let invoice = Invoice::create("t-1", &customer("t-1"), input(), now()).unwrap();

        assert_eq!(invoice.invoice_number, "INV-2025-0007");
        assert_eq!(invoice.customer_name, "Agarwal Saree Centre");
        assert_eq!(invoice.broker_name.as_deref(), Some("Mahesh Broker"));
        assert_eq!(invoice.eway_bill_number, None);
        assert_eq!(invoice.totals.cgst, Money::from_rupees(25));
        assert_eq!(invoice.totals.total_amount, Money::from_rupees(1050));
        assert_eq!(invoice.tax_mode(), TaxMode::IntraState);
        assert_eq!(invoice.created_at, invoice.updated_at);
    }

    #[test]
    fn test_create_rejects_foreign_customer() {
        let result = Invoice::create("t-1", &customer("t-2"), input(), now());
        assert!(matches!(result, Err(CoreError::ForeignCustomer { .. })));
    }

    #[test]
    fn test_create_rejects_empty_items() {
        let mut empty = input();
        empty.items.clear();
        let result = Invoice::create("t-1", &customer("t-1"), empty, now());
        assert!(matches!(result, Err(CoreError::EmptyInvoice { .. })));
    }

    #[test]
    fn test_create_rejects_negative_quantity() {
        let mut bad = input();
        bad.items[0].quantity = dec!(-2);
        let result = Invoice::create("t-1", &customer("t-1"), bad, now());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_create_accepts_zero_quantity_row() {
        let mut with_zero = input();
        let mut sample = with_zero.items[0].clone();
        sample.quantity = dec!(0);
        with_zero.items.push(sample);

        let invoice = Invoice::create("t-1", &customer("t-1"), with_zero, now()).unwrap();
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[1].amount(), Money::ZERO);
        assert_eq!(invoice.totals.total_amount, Money::from_rupees(1050));
    }

    #[test]
    fn test_attach_eway_bill_keeps_totals() {
        let mut invoice = Invoice::create("t-1", &customer("t-1"), input(), now()).unwrap();
        let before = invoice.totals.clone();
        let later = now() + chrono::Duration::hours(3);

        invoice.attach_eway_bill("331001234567", later).unwrap();
        assert_eq!(invoice.eway_bill_number.as_deref(), Some("331001234567"));
        assert_eq!(invoice.updated_at, later);

        invoice.attach_eway_bill("331009999999", later).unwrap();
        assert_eq!(invoice.eway_bill_number.as_deref(), Some("331009999999"));

        assert!(invoice.attach_eway_bill("12345", later).is_err());
        assert_eq!(invoice.totals, before);
    }

    #[test]
    fn test_invoice_json_is_flat() {
        let invoice = Invoice::create("t-1", &customer("t-1"), input(), now()).unwrap();
        let json = serde_json::to_value(&invoice).unwrap();

        assert_eq!(json["invoiceNumber"], "INV-2025-0007");
        let total: Money = serde_json::from_value(json["totalAmount"].clone()).unwrap();
        assert_eq!(total, Money::from_rupees(1050));
        assert_eq!(json["discountRate"], 0);
        assert!(json.get("totals").is_none());

        let back: Invoice = serde_json::from_value(json).unwrap();
        assert_eq!(back.totals, invoice.totals);
    }

    #[test]
    fn test_next_invoice_number() {
        assert_eq!(next_invoice_number(2025, 0), "INV-2025-0001");
        assert_eq!(next_invoice_number(2025, 41), "INV-2025-0042");
        assert_eq!(next_invoice_number(2026, 9999), "INV-2026-10000");
    }
}
