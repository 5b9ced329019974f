//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  GST totals are only rounded ONCE, at the grand total. Every line      │
//! │  amount and every per-item GST must stay exact until then, so integer  │
//! │  paise would already be a rounding step.                               │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    10.5 kg × ₹33.33 × 5% = 17.49825  (kept exactly)                     │
//! │    Only the grand total is rounded to whole rupees (half-up)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billr_core::money::Money;
//!
//! let rate = Money::from_paise(10050);    // ₹100.50
//! let line = rate.times(3.into());        // ₹301.50
//! assert_eq!(line.to_string(), "301.50");
//! assert_eq!(line.round_to_rupee(), Money::from_rupees(302));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount backed by an exact decimal.
///
/// ## Design Decisions
/// - **Decimal (signed)**: round-off adjustments are negative
/// - **Transparent serde**: serialized as the decimal string, e.g. `"1050.00"`
/// - **No float constructors**: amounts come from strings, paise or decimals
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  LineItem.rate ──► LineItem.amount ──► subtotal ──► taxable amount     │
/// │                                                          │              │
/// │                          per-item GST ──► gst amount ────┤              │
/// │                                                          ▼              │
/// │                                   total (rounded) + round-off          │
/// │                                                          │              │
/// │                                 rendered as "₹1050.00" on the invoice  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(as = "String")] Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-rupee amount.
    ///
    /// ```rust
    /// use billr_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(1050).to_string(), "1050.00");
    /// ```
    #[inline]
    pub fn from_rupees(rupees: i64) -> Self {
        Money(Decimal::from(rupees))
    }

    /// Creates an amount from paise (1/100 rupee).
    ///
    /// ```rust
    /// use billr_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(-33).to_string(), "-0.33");
    /// ```
    #[inline]
    pub fn from_paise(paise: i64) -> Self {
        Money(Decimal::new(paise, 2))
    }

    /// Returns the exact underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a (possibly fractional) quantity without rounding.
    ///
    /// ## User Workflow
    /// ```text
    /// Rate: ₹120.00 per Meter
    /// Quantity: 12.5
    ///      │
    ///      ▼
    /// times(12.5) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Amount: ₹1500.000 (exact, displayed ₹1500.00)
    /// ```
    #[inline]
    pub fn times(&self, quantity: Decimal) -> Money {
        Money(self.0 * quantity)
    }

    /// Returns `pct` percent of this amount, exactly.
    ///
    /// ```rust
    /// use billr_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::from_rupees(1000).percent(Decimal::from(5));
    /// assert_eq!(tax, Money::from_rupees(50));
    /// ```
    #[inline]
    pub fn percent(&self, pct: Decimal) -> Money {
        Money(self.0 * pct / Decimal::ONE_HUNDRED)
    }

    /// Splits the amount into two equal halves (CGST / SGST).
    #[inline]
    pub fn half(&self) -> Money {
        Money(self.0 / Decimal::TWO)
    }

    /// Rounds to the nearest whole rupee, halves away from zero.
    ///
    /// ## Rounding Rule
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  HALF-UP (away from zero)                                           │
    /// │                                                                     │
    /// │    1033.33 → 1033        1033.50 → 1034        1033.49 → 1033      │
    /// │                                                                     │
    /// │  Grand totals are always non-negative, so "away from zero" is the  │
    /// │  same as the round-half-up used on printed invoices.               │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    pub fn round_to_rupee(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Rounds to paise for display, halves away from zero.
    pub fn round_to_paise(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display renders exactly two decimal places, without currency symbol.
///
/// ## Note
/// The renderer adds the `₹` prefix and the sign handling for round-off.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = self.round_to_paise().0;
        rounded.rescale(2);
        write!(f, "{}", rounded)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
