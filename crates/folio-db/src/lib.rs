//! # folio-db: Storage and Issuance for Folio
//!
//! SQLite storage for the fiscal invoice engine, and the orchestrator that
//! issues invoices atomically on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Folio Data Flow                                  │
//! │                                                                         │
//! │  Presentation layer (IssueInvoiceCommand)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     folio-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ InvoiceIssuer │───►│  Repositories │    │  Migrations  │  │   │
//! │  │   │ (issuance.rs) │    │ numbering     │    │  (embedded)  │  │   │
//! │  │   │ lock, retry,  │    │ invoice       │    │              │  │   │
//! │  │   │ one tx        │    │ product ...   │    │ 001_init.sql │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ pure math                                          │   │
//! │  │           ▼                                                    │   │
//! │  │   folio-core (tax, ledger, numbering, inventory)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - `folio.toml` loading and env overrides
//! - [`issuance`] - The atomic issue-invoice unit of work
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_db::{Database, FolioConfig};
//!
//! let config = FolioConfig::load_or_default(None);
//! let db = Database::new(config.database.to_db_config()).await?;
//!
//! let issuer = db.issuer(config.issuance.clone());
//! let outcome = issuer.issue_outcome(&command).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod issuance;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DatabaseSettings, FolioConfig, IssuanceSettings};
pub use error::{DbError, DbResult};
pub use issuance::{InvoiceIssuer, IssuanceError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::discount::DiscountRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::numbering::NumberingRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
