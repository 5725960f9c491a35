//! # Credit/Payment Ledger
//!
//! Decides whether an invoice is paid at the counter or opens a receivable.
//!
//! ```text
//!                      ┌──────────────┐
//!   total, tenders ───►│   settle()   │
//!   credit terms       └──────┬───────┘
//!                             │
//!          ┌──────────────────┴──────────────────┐
//!          ▼                                     ▼
//!   is_credit = false                     is_credit = true
//!   paid < total → InsufficientPayment    days ≤ 0      → MissingCreditTerms
//!   else Paid, change = paid − total      walk-in buyer → CreditRequiresIdentifiedCustomer
//!                                         else Created, outstanding = total − paid
//!                                              due = date + days
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SettlementError;
use crate::money::Money;
use crate::types::SettlementStatus;

/// Inputs to [`settle`].
#[derive(Debug, Clone)]
pub struct SettlementRequest<'a> {
    pub total: Money,
    pub paid: Money,
    pub is_credit: bool,
    pub credit_days: Option<i64>,
    pub customer_id: &'a str,
    /// The reserved generic customer that never receives credit.
    pub walk_in_customer_id: &'a str,
    pub date: NaiveDate,
}

/// How an invoice was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    pub status: SettlementStatus,
    pub outstanding: Money,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub credit_days: i64,
    pub cash_received: Money,
    pub change: Money,
}

/// Settles an invoice total against the collected tenders.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use folio_core::ledger::{settle, SettlementRequest};
/// use folio_core::money::Money;
/// use folio_core::types::SettlementStatus;
///
/// let settlement = settle(&SettlementRequest {
///     total: Money::from_cents(10350),
///     paid: Money::from_cents(20000),
///     is_credit: false,
///     credit_days: None,
///     customer_id: "walk-in",
///     walk_in_customer_id: "walk-in",
///     date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
/// })
/// .unwrap();
///
/// assert_eq!(settlement.status, SettlementStatus::Paid);
/// assert_eq!(settlement.change.cents(), 9650);
/// ```
pub fn settle(request: &SettlementRequest<'_>) -> Result<Settlement, SettlementError> {
    let change = (request.paid - request.total).non_negative();

    if !request.is_credit {
        if request.paid < request.total {
            return Err(SettlementError::InsufficientPayment {
                total: request.total,
                paid: request.paid,
            });
        }

        return Ok(Settlement {
            status: SettlementStatus::Paid,
            outstanding: Money::zero(),
            due_date: None,
            credit_days: 0,
            cash_received: request.paid,
            change,
        });
    }

    let days = match request.credit_days {
        Some(days) if days > 0 => days,
        _ => return Err(SettlementError::MissingCreditTerms),
    };

    if request.customer_id == request.walk_in_customer_id {
        return Err(SettlementError::CreditRequiresIdentifiedCustomer);
    }

    let due_date = Duration::try_days(days)
        .and_then(|term| request.date.checked_add_signed(term))
        .ok_or(SettlementError::MissingCreditTerms)?;

    Ok(Settlement {
        status: SettlementStatus::Created,
        outstanding: (request.total - request.paid).non_negative(),
        due_date: Some(due_date),
        credit_days: days,
        cash_received: request.paid,
        change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK_IN: &str = "walk-in";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 25).unwrap()
    }

    fn request(total: i64, paid: i64, credit_days: Option<i64>) -> SettlementRequest<'static> {
        SettlementRequest {
            total: Money::from_cents(total),
            paid: Money::from_cents(paid),
            is_credit: credit_days.is_some(),
            credit_days,
            customer_id: "acme",
            walk_in_customer_id: WALK_IN,
            date: date(),
        }
    }

    #[test]
    fn test_cash_insufficient_payment() {
        let err = settle(&request(10350, 10000, None)).unwrap_err();
        assert_eq!(
            err,
            SettlementError::InsufficientPayment {
                total: Money::from_cents(10350),
                paid: Money::from_cents(10000),
            }
        );
    }

    #[test]
    fn test_cash_exact_payment() {
        let s = settle(&request(10350, 10350, None)).unwrap();
        assert_eq!(s.status, SettlementStatus::Paid);
        assert!(s.outstanding.is_zero());
        assert!(s.change.is_zero());
        assert_eq!(s.cash_received.cents(), 10350);
        assert_eq!(s.due_date, None);
    }

    #[test]
    fn test_cash_overpayment_gives_change() {
        let s = settle(&request(10350, 20000, None)).unwrap();
        assert_eq!(s.change.cents(), 9650);
        assert_eq!(s.cash_received.cents(), 20000);
    }

    #[test]
    fn test_credit_partial_payment() {
        let s = settle(&request(10350, 3000, Some(30))).unwrap();
        assert_eq!(s.status, SettlementStatus::Created);
        assert_eq!(s.outstanding.cents(), 7350);
        assert_eq!(s.credit_days, 30);
        assert_eq!(s.due_date, NaiveDate::from_ymd_opt(2026, 2, 24));
    }

    #[test]
    fn test_credit_without_payment() {
        let s = settle(&request(5000, 0, Some(15))).unwrap();
        assert_eq!(s.outstanding.cents(), 5000);
        assert!(s.change.is_zero());
    }

    #[test]
    fn test_credit_requires_terms() {
        assert_eq!(
            settle(&request(5000, 0, Some(0))).unwrap_err(),
            SettlementError::MissingCreditTerms
        );

        let mut missing = request(5000, 0, None);
        missing.is_credit = true;
        assert_eq!(
            settle(&missing).unwrap_err(),
            SettlementError::MissingCreditTerms
        );
    }

    #[test]
    fn test_credit_rejected_for_walk_in() {
        let mut req = request(5000, 0, Some(30));
        req.customer_id = WALK_IN;
        assert_eq!(
            settle(&req).unwrap_err(),
            SettlementError::CreditRequiresIdentifiedCustomer
        );
    }

    #[test]
    fn test_unrepresentable_due_date_is_an_error() {
        for days in [i64::MAX, 400_000_000] {
            assert_eq!(
                settle(&request(5000, 0, Some(days))).unwrap_err(),
                SettlementError::MissingCreditTerms
            );
        }
    }
}
