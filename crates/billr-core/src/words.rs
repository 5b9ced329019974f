//! # Number to Words
//!
//! Spells rupee amounts the way Indian invoices print them.
//!
//! ## Indian Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   1,23,45,678                                                           │
//! │   │  │  │  └── Hundreds/Tens/Ones: "Six Hundred Seventy Eight"         │
//! │   │  │  └───── Thousand (2 digits): "Forty Five Thousand"              │
//! │   │  └──────── Lakh (2 digits):     "Twenty Three Lakh"                │
//! │   └─────────── Crore (any size):    "One Crore"                        │
//! │                                                                         │
//! │   Crore counts above 99 are spelled recursively:                       │
//! │   1000,00,00,000 → "One Thousand Crore"                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the integer part is spelled; the grand total is already rounded to
//! whole rupees by the time it is printed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::money::Money;

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

const TEENS: [&str; 10] = [
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u128 = 10_000_000;
const LAKH: u128 = 100_000;
const THOUSAND: u128 = 1_000;

/// Spells the integer part of `amount` in Indian numbering.
///
/// Fractions are dropped and the sign is ignored (negative totals never
/// reach the printer).
///
/// ```rust
/// use billr_core::words::number_to_words;
/// use rust_decimal::Decimal;
///
/// assert_eq!(number_to_words(Decimal::from(1050)), "One Thousand Fifty");
/// assert_eq!(number_to_words(Decimal::from(10_000_000)), "One Crore");
/// assert_eq!(number_to_words(Decimal::ZERO), "Zero");
/// ```
pub fn number_to_words(amount: Decimal) -> String {
    let n = amount.trunc().abs().to_u128().unwrap_or(0);
    if n == 0 {
        return "Zero".to_string();
    }

    let mut words = Vec::new();
    spell(n, &mut words);
    words.join(" ")
}

/// Grand-total line for the invoice: `"<words> Rupees Only"`.
pub fn amount_in_words(total: Money) -> String {
    format!("{} Rupees Only", number_to_words(total.amount()))
}

fn spell(n: u128, words: &mut Vec<&'static str>) {
    let crores = n / CRORE;
    let mut rest = n % CRORE;

    if crores > 0 {
        spell(crores, words);
        words.push("Crore");
    }

    let lakhs = rest / LAKH;
    rest %= LAKH;
    if lakhs > 0 {
        below_hundred(lakhs, words);
        words.push("Lakh");
    }

    let thousands = rest / THOUSAND;
    rest %= THOUSAND;
    if thousands > 0 {
        below_hundred(thousands, words);
        words.push("Thousand");
    }

    if rest > 0 {
        below_thousand(rest, words);
    }
}

fn below_thousand(n: u128, words: &mut Vec<&'static str>) {
    let hundreds = (n / 100) as usize;
    if hundreds > 0 {
        words.push(ONES[hundreds]);
        words.push("Hundred");
    }
    let rest = n % 100;
    if rest > 0 {
        below_hundred(rest, words);
    }
}

fn below_hundred(n: u128, words: &mut Vec<&'static str>) {
    let n = n as usize;
    match n {
        0 => {}
        1..=9 => words.push(ONES[n]),
        10..=19 => words.push(TEENS[n - 10]),
        _ => {
            words.push(TENS[n / 10]);
            if n % 10 > 0 {
                words.push(ONES[n % 10]);
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
    use rust_decimal_macros::dec;

    fn words(n: i64) -> String {
        number_to_words(Decimal::from(n))
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(words(0), "Zero");
        assert_eq!(words(7), "Seven");
        assert_eq!(words(10), "Ten");
        assert_eq!(words(13), "Thirteen");
        assert_eq!(words(19), "Nineteen");
        assert_eq!(words(20), "Twenty");
        assert_eq!(words(45), "Forty Five");
        assert_eq!(words(99), "Ninety Nine");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(words(100), "One Hundred");
        assert_eq!(words(101), "One Hundred One");
        assert_eq!(words(515), "Five Hundred Fifteen");
        assert_eq!(words(999), "Nine Hundred Ninety Nine");
    }

    #[test]
    fn test_thousands_and_lakhs() {
        assert_eq!(words(1050), "One Thousand Fifty");
        assert_eq!(words(1000), "One Thousand");
        assert_eq!(words(45_000), "Forty Five Thousand");
        assert_eq!(words(100_000), "One Lakh");
        assert_eq!(
            words(1_234_567),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven"
        );
    }

    #[test]
    fn test_crores() {
        assert_eq!(words(10_000_000), "One Crore");
        assert_eq!(
            words(12_345_678),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight"
        );
        assert_eq!(words(10_000_000_000), "One Thousand Crore");
    }

    #[test]
    fn test_fraction_dropped() {
        assert_eq!(number_to_words(dec!(99.99)), "Ninety Nine");
        assert_eq!(number_to_words(dec!(0.75)), "Zero");
    }

    #[test]
    fn test_no_double_spaces() {
        for n in [1, 10, 100, 1001, 100_001, 10_000_001, 200_000_000] {
            let w = words(n);
            assert!(!w.contains("  "), "{n} -> {w:?}");
            assert_eq!(w, w.trim());
        }
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(
            amount_in_words(Money::from_rupees(1050)),
            "One Thousand Fifty Rupees Only"
        );
    }
}
