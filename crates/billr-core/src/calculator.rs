//! # Tax & Totals Calculator
//!
//! Turns line items, a discount rate and the same-state flag into a
//! [`TaxBreakdown`].
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GST Calculation Pipeline                           │
//! │                                                                         │
//! │  items ──► subtotal = Σ qty × rate                                     │
//! │                │                                                        │
//! │                ▼                                                        │
//! │            discount = subtotal × d / 100                               │
//! │            taxable  = subtotal − discount                              │
//! │                │                                                        │
//! │  items ──► gst = Σ qty × rate × (1 − d/100) × gstRate / 100            │
//! │                │        (per item, never a blended rate)               │
//! │                ▼                                                        │
//! │       ┌────────┴────────┐                                               │
//! │   same state        other state                                        │
//! │   cgst = sgst = gst/2   igst = gst                                     │
//! │       └────────┬────────┘                                               │
//! │                ▼                                                        │
//! │            raw   = taxable + gst                                       │
//! │            total = round_half_up(raw)   ◄── the ONLY rounding step     │
//! │            roundOff = total − raw                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities and rates are validated before they get here
//! (see [`crate::validation`]), so none of these functions fail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountRate, GstRate, LineItem, TaxBreakdown, TaxMode};

// =============================================================================
// Totals
// =============================================================================

/// Computes the full tax breakdown for an invoice.
///
/// An empty item list yields an all-zero breakdown.
///
/// ## Example
/// ```rust
/// use billr_core::calculator::calculate;
/// use billr_core::{DiscountRate, GstRate, LineItem, Money};
/// use rust_decimal::Decimal;
///
/// let items = vec![LineItem {
///     product_name: "Cotton Shirting".to_string(),
///     hsn_code: "5208".to_string(),
///     unit: "Pcs".to_string(),
///     quantity: Decimal::from(10),
///     rate: Money::from_rupees(100),
///     gst_rate: GstRate::FIVE,
/// }];
///
/// let totals = calculate(&items, DiscountRate::NONE, true);
/// assert_eq!(totals.cgst, Money::from_rupees(25));
/// assert_eq!(totals.total_amount, Money::from_rupees(1050));
/// ```
pub fn calculate(items: &[LineItem], discount_rate: DiscountRate, is_same_state: bool) -> TaxBreakdown {
    calculate_for_mode(items, discount_rate, TaxMode::from_same_state(is_same_state))
}

/// Same as [`calculate`], taking an explicit [`TaxMode`].
pub fn calculate_for_mode(
    items: &[LineItem],
    discount_rate: DiscountRate,
    mode: TaxMode,
) -> TaxBreakdown {
    let subtotal: Money = items.iter().map(LineItem::amount).sum();
    let discount = subtotal.percent(discount_rate.as_decimal());
    let taxable_amount = subtotal - discount;

    let gst_amount: Money = items
        .iter()
        .map(|item| item_gst(item, discount_rate))
        .sum();

    let (cgst, sgst, igst) = match mode {
        TaxMode::IntraState => {
            let half = gst_amount.half();
            (half, half, Money::ZERO)
        }
        TaxMode::InterState => (Money::ZERO, Money::ZERO, gst_amount),
    };

    let raw_total = taxable_amount + gst_amount;
    let total_amount = raw_total.round_to_rupee();
    let round_off = total_amount - raw_total;

    TaxBreakdown {
        subtotal,
        discount_rate,
        discount,
        taxable_amount,
        gst_amount,
        cgst,
        sgst,
        igst,
        round_off,
        total_amount,
    }
}

/// Taxable value of one line after the invoice discount.
#[inline]
fn item_taxable(item: &LineItem, discount_rate: DiscountRate) -> Money {
    item.amount().times(discount_rate.retained_fraction())
}

/// GST on one line at its own slab.
#[inline]
fn item_gst(item: &LineItem, discount_rate: DiscountRate) -> Money {
    item_taxable(item, discount_rate).percent(item.gst_rate.as_decimal())
}

// =============================================================================
// Per-Rate Summary
// =============================================================================

/// Taxable value and GST collected at one slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RateSummary {
    pub gst_rate: GstRate,
    pub taxable_value: Money,
    pub gst_amount: Money,
}

/// Groups the invoice's taxable value and GST by slab, lowest slab first.
///
/// ```text
/// Item A  ₹1000 @ 5%   ─┐
/// Item B  ₹ 500 @ 5%   ─┼─► 5%:  taxable ₹1500, gst ₹75
/// Item C  ₹2000 @ 18%  ─┴─► 18%: taxable ₹2000, gst ₹360
/// ```
pub fn rate_summary(items: &[LineItem], discount_rate: DiscountRate) -> Vec<RateSummary> {
    let mut by_rate: BTreeMap<GstRate, (Money, Money)> = BTreeMap::new();

    for item in items {
        let entry = by_rate.entry(item.gst_rate).or_default();
        entry.0 += item_taxable(item, discount_rate);
        entry.1 += item_gst(item, discount_rate);
    }

    by_rate
        .into_iter()
        .map(|(gst_rate, (taxable_value, gst_amount))| RateSummary {
            gst_rate,
            taxable_value,
            gst_amount,
        })
        .collect()
}

/// Returns the slab when every item shares one, `None` otherwise
/// (including for an empty list).
pub fn single_rate(items: &[LineItem]) -> Option<GstRate> {
    let first = items.first()?.gst_rate;
    items
        .iter()
        .all(|item| item.gst_rate == first)
        .then_some(first)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, rate: Decimal, gst: GstRate) -> LineItem {
        LineItem {
            product_name: "Test Fabric".to_string(),
            hsn_code: "5208".to_string(),
            unit: "Meter".to_string(),
            quantity,
            rate: Money::new(rate),
            gst_rate: gst,
        }
    }

    #[test]
    fn test_single_item_same_state() {
        let items = vec![item(dec!(10), dec!(100), GstRate::FIVE)];
        let t = calculate(&items, DiscountRate::NONE, true);

        assert_eq!(t.subtotal, Money::from_rupees(1000));
        assert_eq!(t.discount, Money::ZERO);
        assert_eq!(t.taxable_amount, Money::from_rupees(1000));
        assert_eq!(t.gst_amount, Money::from_rupees(50));
        assert_eq!(t.cgst, Money::from_rupees(25));
        assert_eq!(t.sgst, Money::from_rupees(25));
        assert_eq!(t.igst, Money::ZERO);
        assert_eq!(t.total_amount, Money::from_rupees(1050));
        assert_eq!(t.round_off, Money::ZERO);
    }

    #[test]
    fn test_single_item_other_state() {
        let items = vec![item(dec!(10), dec!(100), GstRate::FIVE)];
        let t = calculate(&items, DiscountRate::NONE, false);

        assert_eq!(t.igst, Money::from_rupees(50));
        assert_eq!(t.cgst, Money::ZERO);
        assert_eq!(t.sgst, Money::ZERO);
        assert_eq!(t.total_amount, Money::from_rupees(1050));
    }

    #[test]
    fn test_round_off_down() {
        let items = vec![item(dec!(1), dec!(1033.33), GstRate::NIL)];
        let t = calculate(&items, DiscountRate::NONE, true);

        assert_eq!(t.total_amount, Money::from_rupees(1033));
        assert_eq!(t.round_off, Money::from_paise(-33));
    }

    #[test]
    fn test_round_off_half_goes_up() {
        let items = vec![item(dec!(1), dec!(1033.50), GstRate::NIL)];
        let t = calculate(&items, DiscountRate::NONE, true);

        assert_eq!(t.total_amount, Money::from_rupees(1034));
        assert_eq!(t.round_off, Money::from_paise(50));
    }

    #[test]
    fn test_discount_applied_before_gst() {
        let items = vec![item(dec!(10), dec!(100), GstRate::TWELVE)];
        let t = calculate(&items, DiscountRate::new(10).unwrap(), true);

        assert_eq!(t.discount, Money::from_rupees(100));
        assert_eq!(t.taxable_amount, Money::from_rupees(900));
        assert_eq!(t.gst_amount, Money::from_rupees(108));
        assert_eq!(t.total_amount, Money::from_rupees(1008));
    }

    #[test]
    fn test_heterogeneous_slabs_taxed_per_item() {
        let items = vec![
            item(dec!(1), dec!(1000), GstRate::FIVE),
            item(dec!(1), dec!(1000), GstRate::EIGHTEEN),
        ];
        let t = calculate(&items, DiscountRate::new(10).unwrap(), false);

        // 900 × 5% + 900 × 18%
        assert_eq!(t.taxable_amount, Money::from_rupees(1800));
        assert_eq!(t.gst_amount, Money::from_rupees(207));
        assert_eq!(t.igst, Money::from_rupees(207));
        assert_eq!(t.total_amount, Money::from_rupees(2007));
    }

    #[test]
    fn test_no_intermediate_rounding() {
        let items = vec![item(dec!(10.5), dec!(33.33), GstRate::FIVE)];
        let t = calculate(&items, DiscountRate::NONE, true);

        assert_eq!(t.subtotal.amount(), dec!(349.965));
        assert_eq!(t.gst_amount.amount(), dec!(17.49825));
        assert_eq!(t.unrounded_total().amount(), dec!(367.46325));
        assert_eq!(t.total_amount, Money::from_rupees(367));
        assert_eq!(t.round_off.amount(), dec!(-0.46325));
    }

    #[test]
    fn test_totals_invariants_hold() {
        let items = vec![
            item(dec!(3), dec!(249.99), GstRate::TWELVE),
            item(dec!(7.25), dec!(88.40), GstRate::FIVE),
            item(dec!(2), dec!(1500), GstRate::TWENTY_EIGHT),
        ];
        let t = calculate(&items, DiscountRate::new(7).unwrap(), true);

        assert_eq!(t.taxable_amount, t.subtotal - t.discount);
        assert_eq!(t.cgst + t.sgst, t.gst_amount);
        assert_eq!(t.total_amount, t.unrounded_total().round_to_rupee());
        assert_eq!(t.round_off, t.total_amount - t.unrounded_total());
    }

    #[test]
    fn test_empty_items_all_zero() {
        let t = calculate(&[], DiscountRate::new(15).unwrap(), true);

        assert_eq!(t.subtotal, Money::ZERO);
        assert_eq!(t.gst_amount, Money::ZERO);
        assert_eq!(t.total_amount, Money::ZERO);
        assert_eq!(t.round_off, Money::ZERO);
        assert_eq!(t.discount_rate.percent(), 15);
    }

    #[test]
    fn test_rate_summary_groups_by_slab() {
        let items = vec![
            item(dec!(1), dec!(1000), GstRate::FIVE),
            item(dec!(1), dec!(500), GstRate::FIVE),
            item(dec!(1), dec!(2000), GstRate::EIGHTEEN),
        ];
        let summary = rate_summary(&items, DiscountRate::NONE);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].gst_rate, GstRate::FIVE);
        assert_eq!(summary[0].taxable_value, Money::from_rupees(1500));
        assert_eq!(summary[0].gst_amount, Money::from_rupees(75));
        assert_eq!(summary[1].gst_rate, GstRate::EIGHTEEN);
        assert_eq!(summary[1].gst_amount, Money::from_rupees(360));
    }

    #[test]
    fn test_single_rate() {
        let same = vec![
            item(dec!(1), dec!(10), GstRate::TWELVE),
            item(dec!(2), dec!(10), GstRate::TWELVE),
        ];
        assert_eq!(single_rate(&same), Some(GstRate::TWELVE));

        let mixed = vec![
            item(dec!(1), dec!(10), GstRate::TWELVE),
            item(dec!(1), dec!(10), GstRate::FIVE),
        ];
        assert_eq!(single_rate(&mixed), None);
        assert_eq!(single_rate(&[]), None);
    }
}
