//! # Inventory Adjuster (planning half)
//!
//! Turns sold lines into stock decrements. Applying them is the database
//! layer's job, inside the issuance transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::CartLine;

/// Total quantity of one product sold on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockDecrement {
    pub product_id: String,
    pub quantity: i64,
}

/// Merges lines by product, keeping first-seen order.
///
/// A product sold on two lines gets a single decrement so the zero clamp
/// applies to the combined quantity.
pub fn plan_decrements(lines: &[CartLine]) -> Vec<StockDecrement> {
    let mut decrements: Vec<StockDecrement> = Vec::new();

    for line in lines {
        match decrements.iter_mut().find(|d| d.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => decrements.push(StockDecrement {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            }),
        }
    }

    decrements
}

/// Stock after selling `sold` units; never negative.
#[inline]
pub fn stock_after(current: i64, sold: i64) -> i64 {
    current.saturating_sub(sold).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;

    fn line(product: &str, qty: i64) -> CartLine {
        CartLine {
            product_id: product.to_string(),
            description: product.to_string(),
            quantity: qty,
            tax_id: "isv15".to_string(),
            tax_rate: TaxRate::ISV_15,
            unit_price_cents: 100,
        }
    }

    #[test]
    fn test_merges_same_product() {
        let plan = plan_decrements(&[line("a", 2), line("b", 1), line("a", 3)]);
        assert_eq!(
            plan,
            vec![
                StockDecrement {
                    product_id: "a".into(),
                    quantity: 5
                },
                StockDecrement {
                    product_id: "b".into(),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_stock_clamps_at_zero() {
        assert_eq!(stock_after(10, 3), 7);
        assert_eq!(stock_after(2, 5), 0);
        assert_eq!(stock_after(0, 1), 0);
    }
}
