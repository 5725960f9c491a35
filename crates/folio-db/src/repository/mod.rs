//! # Repository Module
//!
//! One repository per table group. Each exposes a pool-backed handle for
//! reads, and `pub(crate)` executor-generic functions the issuer calls on
//! its open transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.invoices().get_document(id)      ──► &SqlitePool                    │
//! │  invoice::insert_invoice(&mut *tx)   ──► &mut SqliteConnection (in tx)  │
//! │                                                                         │
//! │  Both go through the same SQL; only the executor differs.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`NumberingRepository`](numbering::NumberingRepository) - CAI ranges and the active one
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - issued invoices (read side)
//! - [`ProductRepository`](product::ProductRepository) - price, tax and stock
//! - [`CustomerRepository`](customer::CustomerRepository),
//!   [`UserRepository`](user::UserRepository),
//!   [`DiscountRepository`](discount::DiscountRepository) - referenced collaborators

pub mod customer;
pub mod discount;
pub mod invoice;
pub mod numbering;
pub mod product;
pub mod user;
