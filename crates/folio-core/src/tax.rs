//! # Tax Breakdown Calculator
//!
//! Splits a cart into per-rate taxed bases and tax amounts.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For every line:                                                        │
//! │                                                                         │
//! │    gross          = quantity × unit_price                  (cents)      │
//! │    after_discount = gross × (10000 − discount_bps)         (cents×10⁴)  │
//! │    tax            = after_discount × rate_bps              (cents×10⁸)  │
//! │                                                                         │
//! │  Accumulate exactly per rate bucket (i128, no rounding yet):            │
//! │                                                                         │
//! │    0%   ──► exempt                                                      │
//! │    15%  ──► taxed_15 / tax_15                                           │
//! │    18%  ──► taxed_18 / tax_18                                           │
//! │    any  ──► other[rate]                                                 │
//! │                                                                         │
//! │  Round each bucket ONCE, half-up, to cents. Then:                       │
//! │                                                                         │
//! │    subtotal    = Σ bases                                                │
//! │    total_taxes = Σ taxes                                                │
//! │    total       = subtotal + total_taxes      (exact, by construction)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is exclusive: it is added on top of the after-discount base and is
//! never extracted from a tax-inclusive price.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartLine, TaxRate};

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Breakdown Types
// =============================================================================

/// Per-line amounts, each rounded independently for the line snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineAmounts {
    pub gross: Money,
    pub discount: Money,
    pub after_discount: Money,
    pub tax: Money,
}

/// Base and tax accumulated for one rate outside the standard buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateBucket {
    pub rate: TaxRate,
    pub taxed: Money,
    pub tax: Money,
}

/// Result of [`compute_breakdown`].
///
/// ## Invariants
/// - `total == subtotal + total_taxes`
/// - `subtotal == exempt + taxed_15 + taxed_18 + Σ other.taxed`
/// - `total_discount == gross - subtotal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBreakdown {
    pub gross: Money,
    pub exempt: Money,
    pub taxed_15: Money,
    pub tax_15: Money,
    pub taxed_18: Money,
    pub tax_18: Money,
    /// Buckets for any other declared rate, ordered by rate.
    pub other: Vec<RateBucket>,
    pub subtotal: Money,
    pub total_discount: Money,
    pub total_taxes: Money,
    pub total: Money,
    /// One entry per input line, same order.
    pub lines: Vec<LineAmounts>,
}

impl TaxBreakdown {
    /// Sum of bases taxed at non-standard rates.
    pub fn taxed_other(&self) -> Money {
        self.other.iter().map(|b| b.taxed).sum()
    }

    /// Sum of taxes at non-standard rates.
    pub fn tax_other(&self) -> Money {
        self.other.iter().map(|b| b.tax).sum()
    }
}

// =============================================================================
// Calculator
// =============================================================================

#[derive(Default)]
struct ScaledBucket {
    /// cents × 10^4
    base: i128,
    /// cents × 10^8
    tax: i128,
}

fn discount_factor(discount_bps: u32) -> i128 {
    BPS_SCALE - (discount_bps as i128).min(BPS_SCALE)
}

/// Computes the snapshot amounts for a single line.
///
/// ## Example
/// ```rust
/// use folio_core::tax::line_amounts;
/// use folio_core::types::{CartLine, TaxRate};
///
/// let line = CartLine {
///     product_id: "p".into(),
///     description: "Item".into(),
///     quantity: 1,
///     tax_id: "isv15".into(),
///     tax_rate: TaxRate::ISV_15,
///     unit_price_cents: 10000,
/// };
/// let amounts = line_amounts(&line, 1000); // 10% discount
/// assert_eq!(amounts.after_discount.cents(), 9000);
/// assert_eq!(amounts.tax.cents(), 1350);
/// ```
pub fn line_amounts(line: &CartLine, discount_bps: u32) -> LineAmounts {
    let gross = line.unit_price().multiply_quantity(line.quantity);
    let after_scaled = gross.cents() as i128 * discount_factor(discount_bps);
    let tax_scaled = after_scaled * line.tax_rate.bps() as i128;

    let after_discount = Money::from_scaled_half_up(after_scaled, BPS_SCALE);
    LineAmounts {
        gross,
        discount: gross - after_discount,
        after_discount,
        tax: Money::from_scaled_half_up(tax_scaled, BPS_SCALE * BPS_SCALE),
    }
}

/// Computes the full tax breakdown of a cart.
///
/// Pure and deterministic. Rounding happens once per bucket, so the
/// persisted totals never drift from the sum of their parts.
pub fn compute_breakdown(lines: &[CartLine], discount_bps: u32) -> TaxBreakdown {
    let factor = discount_factor(discount_bps);
    let mut gross = Money::zero();
    let mut buckets: BTreeMap<u32, ScaledBucket> = BTreeMap::new();

    for line in lines {
        let line_gross = line.unit_price().multiply_quantity(line.quantity);
        gross += line_gross;

        let after_scaled = line_gross.cents() as i128 * factor;
        let bucket = buckets.entry(line.tax_rate.bps()).or_default();
        bucket.base += after_scaled;
        bucket.tax += after_scaled * line.tax_rate.bps() as i128;
    }

    let mut breakdown = TaxBreakdown {
        gross,
        exempt: Money::zero(),
        taxed_15: Money::zero(),
        tax_15: Money::zero(),
        taxed_18: Money::zero(),
        tax_18: Money::zero(),
        other: Vec::new(),
        subtotal: Money::zero(),
        total_discount: Money::zero(),
        total_taxes: Money::zero(),
        total: Money::zero(),
        lines: lines.iter().map(|l| line_amounts(l, discount_bps)).collect(),
    };

    for (bps, bucket) in buckets {
        let taxed = Money::from_scaled_half_up(bucket.base, BPS_SCALE);
        let tax = Money::from_scaled_half_up(bucket.tax, BPS_SCALE * BPS_SCALE);
        let rate = TaxRate::from_bps(bps);

        if rate == TaxRate::EXEMPT {
            breakdown.exempt = taxed;
        } else if rate == TaxRate::ISV_15 {
            breakdown.taxed_15 = taxed;
            breakdown.tax_15 = tax;
        } else if rate == TaxRate::ISV_18 {
            breakdown.taxed_18 = taxed;
            breakdown.tax_18 = tax;
        } else {
            breakdown.other.push(RateBucket { rate, taxed, tax });
        }

        breakdown.subtotal += taxed;
        breakdown.total_taxes += tax;
    }

    breakdown.total = breakdown.subtotal + breakdown.total_taxes;
    breakdown.total_discount = breakdown.gross - breakdown.subtotal;
    breakdown
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i64, price: i64, rate: TaxRate) -> CartLine {
        CartLine {
            product_id: "p".to_string(),
            description: "Item".to_string(),
            quantity: qty,
            tax_id: format!("tax-{}", rate.bps()),
            tax_rate: rate,
            unit_price_cents: price,
        }
    }

    #[test]
    fn test_single_line_with_discount() {
        let b = compute_breakdown(&[line(1, 10000, TaxRate::ISV_15)], 1000);

        assert_eq!(b.taxed_15.cents(), 9000);
        assert_eq!(b.tax_15.cents(), 1350);
        assert_eq!(b.subtotal.cents(), 9000);
        assert_eq!(b.total_discount.cents(), 1000);
        assert_eq!(b.total.cents(), 10350);
    }

    #[test]
    fn test_mixed_rates() {
        let lines = vec![
            line(2, 2500, TaxRate::EXEMPT),
            line(1, 10000, TaxRate::ISV_15),
            line(3, 333, TaxRate::ISV_18),
        ];
        let b = compute_breakdown(&lines, 0);

        assert_eq!(b.exempt.cents(), 5000);
        assert_eq!(b.taxed_15.cents(), 10000);
        assert_eq!(b.tax_15.cents(), 1500);
        assert_eq!(b.taxed_18.cents(), 999);
        // 9.99 × 18% = 1.7982
        assert_eq!(b.tax_18.cents(), 180);
        assert_eq!(b.subtotal.cents(), 15999);
        assert_eq!(b.total_taxes.cents(), 1680);
        assert_eq!(b.total.cents(), 17679);
        assert!(b.total_discount.is_zero());
    }

    #[test]
    fn test_rounds_once_per_bucket() {
        // each line alone is 0.45 cents of tax; together 1.35
        let lines = vec![
            line(1, 3, TaxRate::ISV_15),
            line(1, 3, TaxRate::ISV_15),
            line(1, 3, TaxRate::ISV_15),
        ];
        let b = compute_breakdown(&lines, 0);

        assert_eq!(b.tax_15.cents(), 1);
        assert!(b.lines.iter().all(|l| l.tax.is_zero()));
        assert_eq!(b.total.cents(), 10);
    }

    #[test]
    fn test_discount_rounding_half_up() {
        // 3.33 at 10% off = 2.997 → 3.00; tax 0.44955 → 0.45
        let b = compute_breakdown(&[line(1, 333, TaxRate::ISV_15)], 1000);

        assert_eq!(b.taxed_15.cents(), 300);
        assert_eq!(b.tax_15.cents(), 45);
        assert_eq!(b.total_discount.cents(), 33);
        assert_eq!(b.total.cents(), 345);
    }

    #[test]
    fn test_other_rates_get_their_own_bucket() {
        let lines = vec![
            line(1, 1000, TaxRate::from_bps(1250)),
            line(1, 1000, TaxRate::from_bps(700)),
            line(1, 1000, TaxRate::from_bps(1250)),
        ];
        let b = compute_breakdown(&lines, 0);

        assert_eq!(b.other.len(), 2);
        assert_eq!(b.other[0].rate.bps(), 700);
        assert_eq!(b.other[0].tax.cents(), 70);
        assert_eq!(b.other[1].taxed.cents(), 2000);
        assert_eq!(b.other[1].tax.cents(), 250);
        assert_eq!(b.taxed_other().cents(), 3000);
        assert_eq!(b.tax_other().cents(), 320);
        assert_eq!(b.total.cents(), 3320);
    }

    #[test]
    fn test_breakdown_identity_holds() {
        let carts = vec![
            vec![line(7, 1999, TaxRate::ISV_15), line(1, 1, TaxRate::ISV_18)],
            vec![line(13, 77, TaxRate::EXEMPT), line(2, 4321, TaxRate::ISV_15)],
            vec![line(999, 12345, TaxRate::ISV_18)],
        ];

        for discount in [0, 500, 1250, 3333, 10000] {
            for cart in &carts {
                let b = compute_breakdown(cart, discount);
                assert_eq!(b.total, b.subtotal + b.total_taxes);
                assert_eq!(
                    b.subtotal,
                    b.exempt + b.taxed_15 + b.taxed_18 + b.taxed_other()
                );
                assert_eq!(b.total_discount, b.gross - b.subtotal);

                // per-line snapshots agree with the bucket totals to the cent
                let line_total: Money =
                    b.lines.iter().map(|l| l.after_discount + l.tax).sum();
                let drift = (line_total - b.total).cents().abs();
                assert!(drift <= 2 * cart.len() as i64, "drift {}", drift);
            }
        }
    }

    #[test]
    fn test_full_discount_and_empty_cart() {
        let b = compute_breakdown(&[line(2, 500, TaxRate::ISV_15)], 10000);
        assert!(b.total.is_zero());
        assert_eq!(b.total_discount.cents(), 1000);

        let b = compute_breakdown(&[], 0);
        assert!(b.total.is_zero());
        assert!(b.lines.is_empty());
    }
}
