//! # billr-core: Pure Business Logic for CloudBillr
//!
//! This crate is the **heart** of CloudBillr. It contains all GST invoicing
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CloudBillr Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web layer (outside this workspace)           │   │
//! │  │   Customers ──► Products ──► Create Invoice ──► Print / Ledger  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billr-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │calculator │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │  GST/CGST │  │  GSTIN    │  │   │
//! │  │   │ Customer  │  │ (Decimal) │  │  SGST/IGST│  │  qty/rate │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │  invoice  │  │   words   │  │  ledger   │                  │   │
//! │  │   │ lifecycle │  │  Crore /  │  │  brokers  │                  │   │
//! │  │   │ numbering │  │  Lakh     │  │  CSV      │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                  │                                  │                   │
//! │  ┌───────────────▼───────────────┐  ┌───────────────▼───────────────┐  │
//! │  │  billr-db (SQLite, sqlx)      │  │  billr-render (HTML, askama)  │  │
//! │  └───────────────────────────────┘  └───────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, Customer, Company, TaxBreakdown, ...)
//! - [`money`] - Money type over exact decimals (no floating point!)
//! - [`calculator`] - Subtotal, discount, per-item GST, round-off
//! - [`words`] - Indian-numbering amount in words
//! - [`invoice`] - Invoice creation, e-way bill attachment, numbering
//! - [`ledger`] - Broker ledger grouping and CSV reports
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Exact Money**: decimals end to end, one rounding step at the total
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use billr_core::calculator::calculate;
//! use billr_core::words::amount_in_words;
//! use billr_core::{DiscountRate, GstRate, LineItem, Money};
//! use rust_decimal::Decimal;
//!
//! let items = vec![LineItem {
//!     product_name: "Cotton Shirting".to_string(),
//!     hsn_code: "5208".to_string(),
//!     unit: "Pcs".to_string(),
//!     quantity: Decimal::from(10),
//!     rate: Money::from_rupees(100),
//!     gst_rate: GstRate::FIVE,
//! }];
//!
//! let totals = calculate(&items, DiscountRate::NONE, true);
//! assert_eq!(totals.total_amount, Money::from_rupees(1050));
//! assert_eq!(amount_in_words(totals.total_amount), "One Thousand Fifty Rupees Only");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use billr_core::Money` instead of
// `use billr_core::money::Money`

pub use calculator::{calculate, RateSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{next_invoice_number, Invoice, NewInvoice};
pub use ledger::{BrokerLedgerEntry, BrokerSummary};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Ledger label for invoices without a broker.
pub const NO_BROKER: &str = "No Broker";

/// Maximum line items on a single invoice.
///
/// ## Business Reason
/// Keeps a printed invoice to a sane number of pages.
pub const MAX_LINE_ITEMS: usize = 200;

/// Maximum quantity on one line.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Maximum rate per unit, in rupees.
pub const MAX_RATE: i64 = 1_000_000_000_000;

/// Quantities carry at most three decimals (grams, centimetres).
pub const MAX_QUANTITY_SCALE: u32 = 3;

/// Rates carry at most two decimals (paise).
pub const MAX_RATE_SCALE: u32 = 2;

/// Maximum length of product, customer and company names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of an invoice number.
pub const MAX_INVOICE_NUMBER_LEN: usize = 50;
