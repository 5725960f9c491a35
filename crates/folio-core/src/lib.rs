//! # folio-core: Pure Business Logic for Fiscal Invoice Issuance
//!
//! Everything the issuance engine decides, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Folio Issuance Engine                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Presentation layer (out of scope)                      │   │
//! │  │    Cart UI ──► IssueInvoiceCommand ──► render IssuanceOutcome   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ folio-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ numbering │  │    tax    │  │  ledger   │  │ inventory │  │   │
//! │  │   │ reserve() │  │ breakdown │  │ settle()  │  │ decrements│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   money · types · validation · issuance · error                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          folio-db (SQLite + the atomic issuance unit)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point)
//! - [`types`] - Commands, invoices, sold lines, collaborators
//! - [`numbering`] - Numbering authorization and number reservation
//! - [`tax`] - Per-rate tax breakdown
//! - [`ledger`] - Cash / credit settlement
//! - [`inventory`] - Stock decrement planning
//! - [`issuance`] - Stages, failure kinds, record assembly
//! - [`validation`] - Command validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use folio_core::tax::compute_breakdown;
//! use folio_core::types::{CartLine, TaxRate};
//!
//! let lines = vec![CartLine {
//!     product_id: "p".into(),
//!     description: "Coffee 1lb".into(),
//!     quantity: 1,
//!     tax_id: "isv15".into(),
//!     tax_rate: TaxRate::ISV_15,
//!     unit_price_cents: 10000,
//! }];
//!
//! // 10% discount: base 90.00, tax 13.50
//! let breakdown = compute_breakdown(&lines, 1000);
//! assert_eq!(breakdown.total.cents(), 10350);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod issuance;
pub mod ledger;
pub mod money;
pub mod numbering;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, NumberingError, SettlementError, ValidationError};
pub use issuance::{FailureKind, IssuanceOutcome, IssuanceStage};
pub use money::Money;
pub use numbering::{NumberingAuthorization, Reservation};
pub use tax::TaxBreakdown;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reserved generic customer for anonymous counter sales.
///
/// Invoices may be issued to it, credit may not.
pub const WALK_IN_CUSTOMER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum lines allowed on a single invoice.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Digits in the zero-padded correlative part of an invoice number.
pub const INVOICE_NUMBER_WIDTH: usize = 8;

/// Maximum unit price on a line, in cents (L 100,000,000.00).
///
/// Keeps `quantity × price` and every per-rate sum inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 10_000_000_000;

/// Maximum amount of a single tender, in cents (L 1,000,000,000.00).
pub const MAX_PAYMENT_CENTS: i64 = 100_000_000_000;

/// Maximum tenders on a single invoice.
pub const MAX_TENDERS: usize = 20;

/// Longest credit term accepted, in days.
pub const MAX_CREDIT_DAYS: i64 = 3650;
