//! # Domain Types
//!
//! Core domain types used throughout the issuance engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INBOUND (from the cashier session)                                     │
//! │  ┌─────────────────────┐  ┌──────────────┐  ┌──────────────────┐       │
//! │  │ IssueInvoiceCommand │─►│  CartLine    │  │  Tender          │       │
//! │  │  session, customer  │  │  qty, price  │  │  type, amount    │       │
//! │  │  authorization      │  │  tax rate    │  └──────────────────┘       │
//! │  └─────────────────────┘  └──────────────┘                              │
//! │                                                                         │
//! │  PERSISTED (owned by the invoice)                                       │
//! │  ┌─────────────────────┐  ┌──────────────┐  ┌──────────────────┐       │
//! │  │ Invoice             │─►│  SoldLine    │  │  InvoicePayment  │       │
//! │  │  invoice_number     │  │  snapshot    │  │  type, amount    │       │
//! │  │  totals, status     │  └──────────────┘  └──────────────────┘       │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! │  EXTERNAL (read-only collaborators)                                     │
//! │  Product · Customer · User · Discount                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sold lines freeze description, price and tax rate at issuance time; later
//! product edits never change an issued invoice.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1500 bps = 15%.
/// Integer rates keep the whole tax path free of floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Exempt goods.
    pub const EXEMPT: TaxRate = TaxRate(0);
    /// Standard sales tax.
    pub const ISV_15: TaxRate = TaxRate(1500);
    /// Sales tax on alcohol, tobacco and similar goods.
    pub const ISV_18: TaxRate = TaxRate(1800);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage (15 → 15%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        TaxRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::EXEMPT
    }
}

impl std::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// External Collaborators
// =============================================================================

/// A product available for sale. The engine only reads it and decrements stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Stock Keeping Unit - business identifier.
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub tax_rate_bps: u32,
    /// Never negative; sales clamp at zero.
    pub current_stock: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// A customer an invoice is issued to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Tax registration number, absent for anonymous buyers.
    pub rtn: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A cashier account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A named discount the cashier may apply to a whole cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Discount {
    pub id: String,
    pub name: String,
    pub percentage_bps: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inbound Command
// =============================================================================

/// Who is issuing, passed explicitly with every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionContext {
    pub user_id: String,
    pub cash_register_id: Option<String>,
}

/// One cart entry as submitted by the cashier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub description: String,
    pub quantity: i64,
    pub tax_id: String,
    pub tax_rate: TaxRate,
    pub unit_price_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// One tender entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tender {
    pub payment_type_id: String,
    pub amount_cents: i64,
}

impl Tender {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Discount chosen for the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountSelection {
    pub discount_id: String,
    pub percentage_bps: u32,
}

/// Everything the presentation layer submits to issue one invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IssueInvoiceCommand {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_id: String,
    pub authorization_id: String,
    pub session: SessionContext,
    pub discount: Option<DiscountSelection>,
    pub lines: Vec<CartLine>,
    pub payments: Vec<Tender>,
    pub is_credit: bool,
    pub credit_days: Option<i64>,
}

impl IssueInvoiceCommand {
    /// Discount percentage in basis points, zero when none was selected.
    pub fn discount_bps(&self) -> u32 {
        self.discount.as_ref().map(|d| d.percentage_bps).unwrap_or(0)
    }

    /// Sum of all tenders.
    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(Tender::amount).sum()
    }
}

// =============================================================================
// Settlement Status
// =============================================================================

/// Whether the invoice was settled at issuance or opened a receivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Fully paid at the counter.
    Paid,
    /// Pending credit; the outstanding amount is owed by the customer.
    Created,
}

// =============================================================================
// Invoice
// =============================================================================

/// An issued fiscal invoice.
///
/// ## Invariants
/// - `total_cents == subtotal_cents + tax_cents`
/// - `outstanding_cents == 0` unless `status == Created`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub authorization_id: String,
    /// `prefix + zero-pad(correlative, 8)`.
    pub invoice_number: String,
    pub correlative: i64,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    pub customer_id: String,
    pub user_id: String,
    pub cash_register_id: Option<String>,
    pub discount_id: Option<String>,
    pub discount_bps: u32,
    /// Sum of after-discount bases, before tax.
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub exempt_cents: i64,
    pub taxed_15_cents: i64,
    pub tax_15_cents: i64,
    pub taxed_18_cents: i64,
    pub tax_18_cents: i64,
    pub taxed_other_cents: i64,
    pub tax_other_cents: i64,
    pub cash_received_cents: i64,
    pub change_cents: i64,
    pub status: SettlementStatus,
    pub outstanding_cents: i64,
    pub credit_days: i64,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.outstanding_cents)
    }
}

/// A cart line materialized on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SoldLine {
    pub id: String,
    pub invoice_id: String,
    /// 1-based position on the printed invoice.
    pub line_number: i64,
    pub product_id: String,
    /// Description at time of sale (frozen).
    pub description: String,
    pub quantity: i64,
    pub tax_id: String,
    pub tax_rate_bps: u32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    /// After-discount amount, before tax.
    pub line_total_cents: i64,
}

/// A tender recorded against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoicePayment {
    pub id: String,
    pub invoice_id: String,
    pub payment_type_id: String,
    pub amount_cents: i64,
}

/// A committed invoice together with everything it owns.
/// This is what renderers and receivable views read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceDocument {
    pub invoice: Invoice,
    pub lines: Vec<SoldLine>,
    pub payments: Vec<InvoicePayment>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_constants() {
        assert_eq!(TaxRate::ISV_15.bps(), 1500);
        assert_eq!(TaxRate::from_percent(18), TaxRate::ISV_18);
        assert!(TaxRate::EXEMPT.is_zero());
        assert_eq!(TaxRate::ISV_15.to_string(), "15.00%");
    }

    #[test]
    fn test_command_helpers() {
        let command = IssueInvoiceCommand {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            customer_id: "c".into(),
            authorization_id: "a".into(),
            session: SessionContext {
                user_id: "u".into(),
                cash_register_id: None,
            },
            discount: None,
            lines: vec![],
            payments: vec![
                Tender {
                    payment_type_id: "cash".into(),
                    amount_cents: 5000,
                },
                Tender {
                    payment_type_id: "card".into(),
                    amount_cents: 5350,
                },
            ],
            is_credit: false,
            credit_days: None,
        };

        assert_eq!(command.discount_bps(), 0);
        assert_eq!(command.total_paid().cents(), 10350);
    }

    #[test]
    fn test_settlement_status_serializes_snake_case() {
        let json = serde_json::to_string(&SettlementStatus::Created).unwrap();
        assert_eq!(json, "\"created\"");
    }
}
