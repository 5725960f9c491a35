//! # Error Types
//!
//! Domain-specific error types for folio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  folio-core errors (this file)                                         │
//! │  ├── ValidationError  - malformed command or missing reference         │
//! │  ├── NumberingError   - authorization cannot hand out a number         │
//! │  ├── SettlementError  - payments / credit terms do not settle          │
//! │  └── CoreError        - any of the above, from the pure pipeline       │
//! │                                                                         │
//! │  folio-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── IssuanceError    - what the orchestrator returns                  │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        NumberingError  ─┼─► CoreError ─► IssuanceError ─► Outcome      │
//! │        SettlementError ─┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (authorization id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Failure of the pure issuance pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Numbering error: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when the command doesn't meet requirements or
/// references something that does not exist. No side effects have
/// happened when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A referenced entity does not exist (or is disabled).
    #[error("{entity} not found: {id}")]
    UnknownReference { entity: String, id: String },

    /// Cart line is malformed.
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    /// Authorization range or counters are inconsistent.
    #[error("Invalid numbering range: {reason}")]
    InvalidNumberingRange { reason: String },
}

impl ValidationError {
    /// Creates an UnknownReference error.
    pub fn unknown(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ValidationError::UnknownReference {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Numbering Error
// =============================================================================

/// The numbering authorization cannot hand out the next number.
///
/// These require operator action (configure or activate an authorization);
/// they are never retried automatically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Numbering authorization not found: {id}")]
    NotFound { id: String },

    #[error("Numbering authorization {id} is not active")]
    Inactive { id: String },

    #[error("Numbering authorization {id} expired on {valid_to}")]
    Expired { id: String, valid_to: NaiveDate },

    #[error("Numbering authorization {id} is not valid before {valid_from}")]
    NotYetValid { id: String, valid_from: NaiveDate },

    #[error("Numbering authorization {id} has no invoice numbers left")]
    Exhausted { id: String },
}

// =============================================================================
// Settlement Error
// =============================================================================

/// Payments and credit terms do not settle the invoice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    #[error("Credit invoices require a positive number of credit days")]
    MissingCreditTerms,

    #[error("Credit cannot be granted to the walk-in customer")]
    CreditRequiresIdentifiedCustomer,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SettlementError::InsufficientPayment {
            total: Money::from_cents(10350),
            paid: Money::from_cents(10000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total 103.50, paid 100.00"
        );

        let err = NumberingError::Exhausted { id: "cai-1".into() };
        assert_eq!(
            err.to_string(),
            "Numbering authorization cai-1 has no invoice numbers left"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        assert_eq!(err.to_string(), "customer_id is required");

        let err = ValidationError::unknown("Customer", "abc");
        assert_eq!(err.to_string(), "Customer not found: abc");
    }

    #[test]
    fn test_errors_convert_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "lines".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = SettlementError::MissingCreditTerms.into();
        assert!(matches!(core_err, CoreError::Settlement(_)));
    }
}
