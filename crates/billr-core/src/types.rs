//! # Domain Types
//!
//! Core domain types used throughout CloudBillr.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Company      │   │    Customer     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  tenant_id      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  gstin          │   │  gst_number     │   │  hsn_code       │       │
//! │  │  bank_accounts  │   │  state          │   │  default_gst    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    GstRate      │   │  DiscountRate   │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  0/5/12/18/28 % │   │  0..=100 %      │   │  quantity×rate  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  TaxBreakdown: everything the calculator derives for one invoice       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All types serialize as camelCase JSON, the shape the web layer already
//! speaks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST slab in whole percent.
///
/// ## Allowed Slabs
/// India levies GST at 0%, 5%, 12%, 18% or 28%. Anything else is rejected
/// at construction and at deserialization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(try_from = "u8", into = "u8")]
#[ts(export)]
pub struct GstRate(u8);

impl GstRate {
    pub const NIL: GstRate = GstRate(0);
    pub const FIVE: GstRate = GstRate(5);
    pub const TWELVE: GstRate = GstRate(12);
    pub const EIGHTEEN: GstRate = GstRate(18);
    pub const TWENTY_EIGHT: GstRate = GstRate(28);

    /// Every slab, lowest first.
    pub const SLABS: [GstRate; 5] = [
        GstRate::NIL,
        GstRate::FIVE,
        GstRate::TWELVE,
        GstRate::EIGHTEEN,
        GstRate::TWENTY_EIGHT,
    ];

    /// Creates a GST rate from a whole percentage.
    ///
    /// ```rust
    /// use billr_core::GstRate;
    ///
    /// assert!(GstRate::new(18).is_ok());
    /// assert!(GstRate::new(10).is_err());
    /// ```
    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        GstRate::SLABS
            .iter()
            .copied()
            .find(|slab| slab.0 == percent)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "gst rate".to_string(),
                allowed: GstRate::SLABS.iter().map(|s| s.0.to_string()).collect(),
            })
    }

    /// Returns the rate as a whole percentage.
    #[inline]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Returns the rate as a decimal percentage (5 → 5).
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Returns the CGST/SGST share of this slab (5 → 2.5).
    #[inline]
    pub fn half_percent(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::TWO
    }
}

/// New products default to the 5% slab.
impl Default for GstRate {
    fn default() -> Self {
        GstRate::FIVE
    }
}

impl TryFrom<u8> for GstRate {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        GstRate::new(percent)
    }
}

impl From<GstRate> for u8 {
    fn from(rate: GstRate) -> Self {
        rate.0
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Invoice-level trade discount in whole percent (0..=100).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(try_from = "u8", into = "u8")]
#[ts(export)]
pub struct DiscountRate(u8);

impl DiscountRate {
    /// No discount.
    pub const NONE: DiscountRate = DiscountRate(0);

    /// Creates a discount rate, rejecting anything above 100%.
    pub fn new(percent: u8) -> Result<Self, ValidationError> {
        if percent > 100 {
            return Err(ValidationError::out_of_range("discount rate", 0, 100));
        }
        Ok(DiscountRate(percent))
    }

    /// Returns the rate as a whole percentage.
    #[inline]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Returns the rate as a decimal percentage.
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Returns the share of the amount that remains after discount
    /// (10% → 0.90).
    #[inline]
    pub fn retained_fraction(&self) -> Decimal {
        Decimal::ONE - Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for DiscountRate {
    type Error = ValidationError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        DiscountRate::new(percent)
    }
}

impl From<DiscountRate> for u8 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

// =============================================================================
// Tax Mode
// =============================================================================

/// How GST is levied on an invoice.
///
/// ## Rule
/// ```text
/// supplier state == recipient state ──► IntraState: CGST + SGST (half each)
/// supplier state != recipient state ──► InterState: IGST (full rate)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Supply within one state: CGST + SGST.
    IntraState,
    /// Supply across states: IGST.
    InterState,
}

impl TaxMode {
    /// Maps the `isSameState` flag used throughout the web layer.
    #[inline]
    pub const fn from_same_state(is_same_state: bool) -> Self {
        if is_same_state {
            TaxMode::IntraState
        } else {
            TaxMode::InterState
        }
    }

    /// Derives the mode from two GSTINs by comparing their state codes
    /// (first two digits).
    ///
    /// Returns `None` when either GSTIN is too short to carry a state code.
    ///
    /// ```rust
    /// use billr_core::TaxMode;
    ///
    /// let mode = TaxMode::between("09AADFS1992C1Z6", "09ABCDE1234F1Z5");
    /// assert_eq!(mode, Some(TaxMode::IntraState));
    /// ```
    pub fn between(supplier_gstin: &str, recipient_gstin: &str) -> Option<Self> {
        let supplier = supplier_gstin.trim().get(..2)?;
        let recipient = recipient_gstin.trim().get(..2)?;
        Some(TaxMode::from_same_state(supplier == recipient))
    }

    #[inline]
    pub const fn is_same_state(&self) -> bool {
        matches!(self, TaxMode::IntraState)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// Units offered by the invoice form.
pub const STANDARD_UNITS: [&str; 5] = ["Pcs", "Kg", "Than", "Meter", "Box"];

/// One row of an invoice.
///
/// Immutable once submitted: the invoice keeps the snapshot even if the
/// product catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Description of goods as printed.
    pub product_name: String,

    /// HSN code (may be empty).
    #[serde(default)]
    pub hsn_code: String,

    /// Unit of measure ("Pcs", "Kg", ...).
    pub unit: String,

    /// Quantity, possibly fractional.
    #[ts(as = "String")]
    pub quantity: Decimal,

    /// Price per unit before tax.
    pub rate: Money,

    /// GST slab for this row.
    pub gst_rate: GstRate,
}

impl LineItem {
    /// Line amount before discount and tax (`quantity × rate`), unrounded.
    #[inline]
    pub fn amount(&self) -> Money {
        self.rate.times(self.quantity)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub hsn_code: String,
    pub default_price: Money,
    pub default_gst: GstRate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Builds an invoice row from this product at its default price.
    pub fn to_line_item(&self, quantity: Decimal, unit: &str) -> LineItem {
        LineItem {
            product_name: self.name.clone(),
            hsn_code: self.hsn_code.clone(),
            unit: unit.to_string(),
            quantity,
            rate: self.default_price,
            gst_rate: self.default_gst,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A recipient (purchaser) of invoices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub business_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    /// GSTIN; unregistered buyers have none.
    pub gst_number: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Company
// =============================================================================

/// A bank account printed on the invoice for payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
}

impl BankAccount {
    pub fn new(
        bank_name: impl Into<String>,
        account_number: impl Into<String>,
        ifsc_code: impl Into<String>,
    ) -> Self {
        BankAccount {
            bank_name: bank_name.into(),
            account_number: account_number.into(),
            ifsc_code: ifsc_code.into(),
        }
    }
}

/// The supplier's letterhead: one per account (tenant).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub tenant_id: String,
    pub company_name: String,
    pub company_type: String,
    pub company_address: String,
    pub gstin: String,
    pub phone1: String,
    pub phone2: Option<String>,
    /// May be empty: the renderer then prints its fallback banks.
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
}

impl Company {
    /// Letterhead used for accounts that have not completed their profile.
    pub fn fallback(tenant_id: impl Into<String>) -> Self {
        Company {
            tenant_id: tenant_id.into(),
            company_name: "Shiv Sahai Shri Kishan".to_string(),
            company_type: "WHOLESALER CLOTH MERCHANT".to_string(),
            company_address:
                "1st Floor, Mukherjee Market, Subhash Bazaar, Agra 282003 U.P., INDIA"
                    .to_string(),
            gstin: "09AADFS1992C1Z6".to_string(),
            phone1: "9411924901".to_string(),
            phone2: Some("9410003450".to_string()),
            bank_accounts: Vec::new(),
        }
    }
}

// =============================================================================
// Tax Breakdown
// =============================================================================

/// Everything the calculator derives for one invoice.
///
/// ## Invariants
/// - `taxable_amount = subtotal − discount`
/// - `total_amount = round_half_up(taxable_amount + gst_amount)`
/// - `round_off = total_amount − (taxable_amount + gst_amount)`
/// - exactly one of {`cgst`+`sgst`, `igst`} is non-zero (unless GST is zero)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TaxBreakdown {
    pub subtotal: Money,
    pub discount_rate: DiscountRate,
    pub discount: Money,
    pub taxable_amount: Money,
    pub gst_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub igst: Money,
    pub round_off: Money,
    pub total_amount: Money,
}

impl TaxBreakdown {
    /// Taxable amount plus GST, before rounding.
    #[inline]
    pub fn unrounded_total(&self) -> Money {
        self.taxable_amount + self.gst_amount
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gst_rate_slabs() {
        for pct in [0u8, 5, 12, 18, 28] {
            assert_eq!(GstRate::new(pct).unwrap().percent(), pct);
        }
        assert!(GstRate::new(3).is_err());
        assert!(GstRate::new(100).is_err());
        assert_eq!(GstRate::FIVE.half_percent(), dec!(2.5));
    }

    #[test]
    fn test_gst_rate_deserialize_rejects_unknown_slab() {
        let ok: GstRate = serde_json::from_str("12").unwrap();
        assert_eq!(ok, GstRate::TWELVE);
        assert!(serde_json::from_str::<GstRate>("7").is_err());
    }

    #[test]
    fn test_discount_rate_bounds() {
        assert!(DiscountRate::new(0).is_ok());
        assert!(DiscountRate::new(100).is_ok());
        assert!(DiscountRate::new(101).is_err());
        assert_eq!(DiscountRate::new(10).unwrap().retained_fraction(), dec!(0.90));
        assert!(serde_json::from_str::<DiscountRate>("150").is_err());
    }

    #[test]
    fn test_tax_mode_between_gstins() {
        assert_eq!(
            TaxMode::between("09AADFS1992C1Z6", "07AAACB1234F1Z2"),
            Some(TaxMode::InterState)
        );
        assert_eq!(TaxMode::between("0", "09AADFS1992C1Z6"), None);
        assert!(TaxMode::from_same_state(true).is_same_state());
    }

    #[test]
    fn test_line_item_amount_unrounded() {
        let item = LineItem {
            product_name: "Cotton Than".to_string(),
            hsn_code: "5208".to_string(),
            unit: "Meter".to_string(),
            quantity: dec!(12.5),
            rate: Money::new(dec!(33.33)),
            gst_rate: GstRate::FIVE,
        };
        assert_eq!(item.amount().amount(), dec!(416.625));
    }

    #[test]
    fn test_line_item_json_shape() {
        let json = r#"{
            "productName": "Silk Saree",
            "hsnCode": "5007",
            "unit": "Pcs",
            "quantity": "10",
            "rate": "100",
            "gstRate": 5
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.amount(), Money::from_rupees(1000));
        assert_eq!(item.gst_rate, GstRate::FIVE);
    }

    #[test]
    fn test_product_to_line_item() {
        let product = Product {
            id: "p-1".to_string(),
            tenant_id: "t-1".to_string(),
            name: "Rayon Fabric".to_string(),
            hsn_code: "5408".to_string(),
            default_price: Money::from_rupees(85),
            default_gst: GstRate::default(),
            created_at: Utc::now(),
        };
        let item = product.to_line_item(dec!(4), "Kg");
        assert_eq!(item.unit, "Kg");
        assert_eq!(item.gst_rate, GstRate::FIVE);
        assert_eq!(item.amount(), Money::from_rupees(340));
    }
}
