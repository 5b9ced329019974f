//! # Validation Module
//!
//! Input validation for everything the calculator and the renderer take
//! for granted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Invoice form (browser)                                       │
//! │  ├── Required fields, unit dropdown, GST slab dropdown                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization (serde)                                      │
//! │  ├── GstRate / DiscountRate reject unknown values                      │
//! │  └── THIS MODULE: quantities, rates, GSTIN, numbers                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (tenant_id, invoice_number)                                │
//! │  └── UNIQUE (tenant_id, gst_number)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billr_core::validation::{validate_gstin, validate_eway_bill};
//!
//! assert!(validate_gstin("09AADFS1992C1Z6").is_ok());
//! assert!(validate_eway_bill("331001234567").is_ok());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{BankAccount, LineItem};
use crate::{
    MAX_INVOICE_NUMBER_LEN, MAX_LINE_ITEMS, MAX_NAME_LEN, MAX_QUANTITY, MAX_QUANTITY_SCALE,
    MAX_RATE, MAX_RATE_SCALE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name (product, business, company).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a GSTIN (GST Identification Number).
///
/// ## Format
/// ```text
///   0 9 A A D F S 1 9 9 2 C 1 Z 6
///   └┬┘ └───┬───┘ └──┬──┘ │ │ │ └── checksum character [0-9A-Z]
///    │      │        │    │ │ └──── always 'Z'
///    │      │        │    │ └────── entity number [1-9A-Z]
///    │      │        │    └──────── PAN check letter [A-Z]
///    │      │        └───────────── PAN digits [0-9]{4}
///    │      └────────────────────── PAN letters [A-Z]{5}
///    └───────────────────────────── state code [0-9]{2}
/// ```
///
/// ## Example
/// ```rust
/// use billr_core::validation::validate_gstin;
///
/// assert!(validate_gstin("09AADFS1992C1Z6").is_ok());
/// assert!(validate_gstin("09aadfs1992c1z6").is_err());
/// assert!(validate_gstin("09AADFS1992C1Y6").is_err());
/// ```
pub fn validate_gstin(gstin: &str) -> ValidationResult<()> {
    let gstin = gstin.trim();

    if gstin.is_empty() {
        return Err(ValidationError::required("gstin"));
    }

    let bytes = gstin.as_bytes();
    if bytes.len() != 15 {
        return Err(ValidationError::invalid_format(
            "gstin",
            "must be exactly 15 characters",
        ));
    }

    let digit = |b: u8| b.is_ascii_digit();
    let upper = |b: u8| b.is_ascii_uppercase();

    let well_formed = bytes[0..2].iter().all(|&b| digit(b))
        && bytes[2..7].iter().all(|&b| upper(b))
        && bytes[7..11].iter().all(|&b| digit(b))
        && upper(bytes[11])
        && (matches!(bytes[12], b'1'..=b'9') || upper(bytes[12]))
        && bytes[13] == b'Z'
        && (digit(bytes[14]) || upper(bytes[14]));

    if !well_formed {
        return Err(ValidationError::invalid_format(
            "gstin",
            "must look like 22AAAAA0000A1Z5",
        ));
    }

    Ok(())
}

/// Validates an optional GSTIN: blank means an unregistered buyer.
///
/// ## Returns
/// The trimmed GSTIN, or `None` when blank.
pub fn validate_optional_gstin(gstin: Option<&str>) -> ValidationResult<Option<String>> {
    match gstin.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            validate_gstin(value)?;
            Ok(Some(value.to_string()))
        }
    }
}

/// Validates an invoice number.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
pub fn validate_invoice_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::required("invoice number"));
    }

    if number.len() > MAX_INVOICE_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "invoice number".to_string(),
            max: MAX_INVOICE_NUMBER_LEN,
        });
    }

    Ok(())
}

/// Validates an e-way bill number: exactly 12 digits.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Invoice list: "Add E-way Bill"                                        │
/// │                                                                         │
/// │  Generated on the government portal after the goods ship               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_eway_bill("331001234567") ← THIS FUNCTION                    │
/// │       │                                                                 │
/// │       ├── not 12 digits? → Error                                       │
/// │       │                                                                 │
/// │       └── OK → attach to the invoice, printed on next render           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_eway_bill(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::required("e-way bill number"));
    }

    if number.len() != 12 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "e-way bill number",
            "must be exactly 12 digits",
        ));
    }

    Ok(())
}

/// Validates an IFSC code: 4 letters, a literal `0`, then 6 letters/digits.
pub fn validate_ifsc(ifsc: &str) -> ValidationResult<()> {
    let ifsc = ifsc.trim();

    if ifsc.is_empty() {
        return Err(ValidationError::required("ifsc code"));
    }

    let bytes = ifsc.as_bytes();
    let well_formed = bytes.len() == 11
        && bytes[0..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::invalid_format(
            "ifsc code",
            "must be 11 characters with 0 as the fifth",
        ));
    }

    Ok(())
}

/// Validates a bank account printed on the invoice.
pub fn validate_bank_account(account: &BankAccount) -> ValidationResult<()> {
    validate_name("bank name", &account.bank_name)?;

    let number = account.account_number.trim();
    if number.is_empty() {
        return Err(ValidationError::required("account number"));
    }
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "account number",
            "must contain only digits",
        ));
    }

    validate_ifsc(&account.ifsc_code)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Zero or more (a zero row prints with a zero amount)
/// - At most 1,000,000,000
/// - At most 3 decimal places (grams, centimetres)
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity < Decimal::ZERO || quantity > Decimal::from(MAX_QUANTITY) {
        return Err(ValidationError::out_of_range("quantity", 0, MAX_QUANTITY));
    }

    if quantity.normalize().scale() > MAX_QUANTITY_SCALE {
        return Err(ValidationError::invalid_format(
            "quantity",
            "at most 3 decimal places",
        ));
    }

    Ok(())
}

/// Validates a line-item rate.
///
/// ## Rules
/// - Must be non-negative (free samples are billed at zero)
/// - At most 1,000,000,000,000
/// - At most 2 decimal places (paise)
pub fn validate_rate(rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::from(MAX_RATE) {
        return Err(ValidationError::out_of_range("rate", 0, MAX_RATE));
    }

    if rate.normalize().scale() > MAX_RATE_SCALE {
        return Err(ValidationError::invalid_format(
            "rate",
            "at most 2 decimal places",
        ));
    }

    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates one invoice row.
///
/// GST slab is already enforced by [`crate::GstRate`].
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_name("product name", &item.product_name)?;

    if item.unit.trim().is_empty() {
        return Err(ValidationError::required("unit"));
    }

    validate_quantity(item.quantity)?;
    validate_rate(item.rate.amount())
}

/// Validates the full item list of a new invoice.
///
/// ## Rules
/// - At least one item
/// - At most 200 items
/// - Every item valid
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::out_of_range("items", 1, MAX_LINE_ITEMS));
    }

    items.iter().try_for_each(validate_line_item)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::GstRate;
    use rust_decimal_macros::dec;

    fn item() -> LineItem {
        LineItem {
            product_name: "Chanderi Silk".to_string(),
            hsn_code: "5007".to_string(),
            unit: "Meter".to_string(),
            quantity: dec!(12.5),
            rate: Money::new(dec!(240.50)),
            gst_rate: GstRate::FIVE,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("business name", "Gupta Textiles").is_ok());
        assert!(validate_name("business name", "   ").is_err());
        assert!(matches!(
            validate_name("business name", &"A".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("09AADFS1992C1Z6").is_ok());
        assert!(validate_gstin(" 27AAPFU0939F1ZV ").is_ok());

        assert!(validate_gstin("").is_err());
        assert!(validate_gstin("09AADFS1992C1Z").is_err());
        assert!(validate_gstin("09AADFS1992C0Z6").is_err());
        assert!(validate_gstin("9XAADFS1992C1Z6").is_err());
        assert!(validate_gstin("09AADFS1992C1X6").is_err());
    }

    #[test]
    fn test_validate_optional_gstin() {
        assert_eq!(validate_optional_gstin(None).unwrap(), None);
        assert_eq!(validate_optional_gstin(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_optional_gstin(Some("09AADFS1992C1Z6")).unwrap(),
            Some("09AADFS1992C1Z6".to_string())
        );
        assert!(validate_optional_gstin(Some("bogus")).is_err());
    }

    #[test]
    fn test_validate_invoice_number() {
        assert!(validate_invoice_number("INV-2025-0001").is_ok());
        assert!(validate_invoice_number("").is_err());
        assert!(validate_invoice_number(&"9".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_eway_bill() {
        assert!(validate_eway_bill("331001234567").is_ok());
        assert!(validate_eway_bill("33100123456").is_err());
        assert!(validate_eway_bill("33100123456A").is_err());
        assert!(validate_eway_bill("").is_err());
    }

    #[test]
    fn test_validate_bank_account() {
        let ok = BankAccount::new("PUNJAB NATIONAL BANK", "0030002100090414", "PUNB0003000");
        assert!(validate_bank_account(&ok).is_ok());

        let bad_ifsc = BankAccount::new("CANARA BANK", "3306214000016", "CNRB1006030");
        assert!(validate_bank_account(&bad_ifsc).is_err());

        let bad_number = BankAccount::new("CANARA BANK", "3306-2140", "CNRB0006030");
        assert!(validate_bank_account(&bad_number).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(dec!(1)).is_ok());
        assert!(validate_quantity(dec!(0.125)).is_ok());
        assert!(validate_quantity(dec!(2.5000)).is_ok());

        assert!(validate_quantity(dec!(-1)).is_err());
        assert!(validate_quantity(dec!(1000000001)).is_err());
        assert!(validate_quantity(dec!(0.0001)).is_err());
    }

    #[test]
    fn test_zero_quantity_allowed_negative_rejected() {
        assert!(validate_quantity(dec!(0)).is_ok());
        assert!(validate_quantity(dec!(0.000)).is_ok());

        let err = validate_quantity(dec!(-0.5)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(dec!(0)).is_ok());
        assert!(validate_rate(dec!(1099.99)).is_ok());

        assert!(validate_rate(dec!(-0.01)).is_err());
        assert!(validate_rate(dec!(10.999)).is_err());
        assert!(validate_rate(dec!(1000000000001)).is_err());
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[item()]).is_ok());
        assert!(validate_line_items(&[]).is_err());
        assert!(validate_line_items(&vec![item(); 201]).is_err());

        let mut no_unit = item();
        no_unit.unit = " ".to_string();
        assert!(validate_line_items(&[item(), no_unit]).is_err());
    }
}
