//! # Numbering Authorization
//!
//! The government-issued numbering window ("CAI") and the rules for handing
//! out the next invoice number from it.
//!
//! ## Correlative Window
//! ```text
//!   initial                     current                      final
//!     │                            │                            │
//!     ▼                            ▼                            ▼
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┐
//!   │ ✓ │ ✓ │ ✓ │ ✓ │ ✓ │ ✓ │ ✓ │ · │ · │ · │ · │ · │ · │ · │ · │
//!   └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┘
//!     issued (contiguous)        next       remaining = final − current + 1
//!
//!   current == final + 1  ⇒  exhausted
//! ```
//!
//! This module only decides. The database layer commits the increment with
//! a conditional update in the same transaction as the invoice.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{NumberingError, ValidationError};
use crate::validation::{validate_authorization_window, ValidationResult};
use crate::INVOICE_NUMBER_WIDTH;

// =============================================================================
// Authorization
// =============================================================================

/// One numbering authorization.
///
/// ## Invariants
/// - `initial_correlative <= current_correlative <= final_correlative + 1`
/// - `remaining_invoices == final_correlative - current_correlative + 1`
/// - at most one authorization is active at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct NumberingAuthorization {
    pub id: String,
    /// Government authorization key printed on every invoice.
    pub cai: String,
    /// Fixed segment, e.g. `000-002-01-`.
    pub prefix: String,
    pub initial_correlative: i64,
    pub final_correlative: i64,
    /// Next correlative to allocate.
    pub current_correlative: i64,
    pub remaining_invoices: i64,
    #[ts(as = "String")]
    pub valid_from: NaiveDate,
    #[ts(as = "String")]
    pub valid_to: NaiveDate,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A number handed out by [`NumberingAuthorization::reserve`].
///
/// Holding one commits nothing; the counter only moves when the issuing
/// transaction applies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub authorization_id: String,
    pub correlative: i64,
    pub invoice_number: String,
}

impl NumberingAuthorization {
    /// Creates a fresh, inactive authorization positioned at `initial`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        cai: String,
        prefix: String,
        initial: i64,
        final_correlative: i64,
        valid_from: NaiveDate,
        valid_to: NaiveDate,
        now: DateTime<Utc>,
    ) -> ValidationResult<Self> {
        validate_authorization_window(&prefix, initial, final_correlative, valid_from, valid_to)?;

        Ok(NumberingAuthorization {
            id,
            cai,
            prefix,
            initial_correlative: initial,
            final_correlative,
            current_correlative: initial,
            remaining_invoices: final_correlative - initial + 1,
            valid_from,
            valid_to,
            is_active: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// True once every correlative in the window has been used.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_invoices <= 0 || self.current_correlative > self.final_correlative
    }

    /// Checks the counter invariants.
    pub fn validate_invariants(&self) -> ValidationResult<()> {
        validate_authorization_window(
            &self.prefix,
            self.initial_correlative,
            self.final_correlative,
            self.valid_from,
            self.valid_to,
        )?;

        if self.current_correlative < self.initial_correlative
            || self.current_correlative > self.final_correlative + 1
        {
            return Err(ValidationError::InvalidNumberingRange {
                reason: format!(
                    "current correlative {} outside {}..={}",
                    self.current_correlative,
                    self.initial_correlative,
                    self.final_correlative + 1
                ),
            });
        }

        if self.remaining_invoices != self.final_correlative - self.current_correlative + 1 {
            return Err(ValidationError::InvalidNumberingRange {
                reason: format!(
                    "remaining {} does not match window position",
                    self.remaining_invoices
                ),
            });
        }

        Ok(())
    }

    /// Checks every precondition and returns the number to issue on `date`.
    ///
    /// ## Order
    /// `Inactive` → `Expired` → `NotYetValid` → `Exhausted`
    pub fn reserve(&self, date: NaiveDate) -> Result<Reservation, NumberingError> {
        if !self.is_active {
            return Err(NumberingError::Inactive {
                id: self.id.clone(),
            });
        }

        if date > self.valid_to {
            return Err(NumberingError::Expired {
                id: self.id.clone(),
                valid_to: self.valid_to,
            });
        }

        if date < self.valid_from {
            return Err(NumberingError::NotYetValid {
                id: self.id.clone(),
                valid_from: self.valid_from,
            });
        }

        if self.is_exhausted() {
            return Err(NumberingError::Exhausted {
                id: self.id.clone(),
            });
        }

        Ok(Reservation {
            authorization_id: self.id.clone(),
            correlative: self.current_correlative,
            invoice_number: format_invoice_number(&self.prefix, self.current_correlative),
        })
    }
}

/// Reserves from a looked-up authorization, reporting `NotFound` when the
/// lookup came back empty.
pub fn reserve_next(
    authorization_id: &str,
    found: Option<&NumberingAuthorization>,
    date: NaiveDate,
) -> Result<Reservation, NumberingError> {
    let authorization = found.ok_or_else(|| NumberingError::NotFound {
        id: authorization_id.to_string(),
    })?;
    authorization.reserve(date)
}

/// `prefix + zero-pad(correlative, 8)`.
///
/// ## Example
/// ```rust
/// use folio_core::numbering::format_invoice_number;
///
/// assert_eq!(format_invoice_number("000-002-01-", 1), "000-002-01-00000001");
/// ```
pub fn format_invoice_number(prefix: &str, correlative: i64) -> String {
    format!(
        "{}{:0width$}",
        prefix,
        correlative,
        width = INVOICE_NUMBER_WIDTH
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn authorization() -> NumberingAuthorization {
        let mut auth = NumberingAuthorization::new(
            "auth-1".into(),
            "CAI-TEST".into(),
            "000-002-01-".into(),
            1,
            500,
            d(2026, 1, 1),
            d(2026, 12, 31),
            Utc::now(),
        )
        .unwrap();
        auth.is_active = true;
        auth
    }

    #[test]
    fn test_new_positions_at_initial() {
        let auth = authorization();
        assert_eq!(auth.current_correlative, 1);
        assert_eq!(auth.remaining_invoices, 500);
        assert!(auth.validate_invariants().is_ok());
    }

    #[test]
    fn test_new_rejects_inverted_window() {
        let result = NumberingAuthorization::new(
            "a".into(),
            "CAI".into(),
            "001-".into(),
            10,
            5,
            d(2026, 1, 1),
            d(2026, 12, 31),
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(ValidationError::InvalidNumberingRange { .. })
        ));
    }

    #[test]
    fn test_reserve_formats_number() {
        let reservation = authorization().reserve(d(2026, 3, 1)).unwrap();
        assert_eq!(reservation.correlative, 1);
        assert_eq!(reservation.invoice_number, "000-002-01-00000001");
    }

    #[test]
    fn test_precondition_order() {
        let date = d(2026, 3, 1);

        assert_eq!(
            reserve_next("missing", None, date).unwrap_err(),
            NumberingError::NotFound {
                id: "missing".into()
            }
        );

        // inactive wins over expired
        let mut auth = authorization();
        auth.is_active = false;
        assert!(matches!(
            auth.reserve(d(2027, 1, 1)),
            Err(NumberingError::Inactive { .. })
        ));

        let auth = authorization();
        assert!(matches!(
            auth.reserve(d(2027, 1, 1)),
            Err(NumberingError::Expired { .. })
        ));
        assert!(matches!(
            auth.reserve(d(2025, 12, 31)),
            Err(NumberingError::NotYetValid { .. })
        ));
        // the last day of validity is still usable
        assert!(auth.reserve(d(2026, 12, 31)).is_ok());
    }

    #[test]
    fn test_exhausted_window() {
        let mut auth = authorization();
        auth.current_correlative = 501;
        auth.remaining_invoices = 0;

        assert!(auth.is_exhausted());
        assert!(auth.validate_invariants().is_ok());
        assert!(matches!(
            auth.reserve(d(2026, 3, 1)),
            Err(NumberingError::Exhausted { .. })
        ));
    }

    #[test]
    fn test_invariant_violation_detected() {
        let mut auth = authorization();
        auth.remaining_invoices = 10;
        assert!(auth.validate_invariants().is_err());

        auth.remaining_invoices = 500;
        auth.current_correlative = 0;
        assert!(auth.validate_invariants().is_err());
    }

    #[test]
    fn test_format_pads_to_eight_digits() {
        assert_eq!(format_invoice_number("A-", 12345678), "A-12345678");
        assert_eq!(format_invoice_number("", 42), "00000042");
    }
}
