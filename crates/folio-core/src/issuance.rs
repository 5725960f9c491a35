//! # Issuance Pipeline (pure part)
//!
//! Stage names, failure kinds, the structured outcome handed back to the
//! presentation layer, and the assembly of the invoice records once number,
//! breakdown and settlement are known.
//!
//! ## State Machine
//! ```text
//! ┌────────────┐   ┌────────────────┐   ┌───────────────┐   ┌─────────┐
//! │ Validating │──►│ NumberReserved │──►│ LinesComputed │──►│ Settled │
//! └─────┬──────┘   └───────┬────────┘   └───────────────┘   └────┬────┘
//!       │                  │                                     │
//!       │                  │                                     ▼
//!       │                  │                               ┌───────────┐
//!       │                  │                               │ Persisted │
//!       │                  │                               └─────┬─────┘
//!       ▼                  ▼                                     ▼
//! ┌──────────────────────────────────────┐                ┌───────────┐
//! │          Rejected(kind)              │◄── any stage ──│ Committed │
//! └──────────────────────────────────────┘   before commit└───────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;
use crate::ledger::Settlement;
use crate::numbering::Reservation;
use crate::tax::TaxBreakdown;
use crate::types::{Invoice, InvoiceDocument, InvoicePayment, IssueInvoiceCommand, SoldLine};

// =============================================================================
// Stages and Failure Kinds
// =============================================================================

/// Where an issuance currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum IssuanceStage {
    Validating,
    NumberReserved,
    LinesComputed,
    Settled,
    Persisted,
    Committed,
}

impl fmt::Display for IssuanceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssuanceStage::Validating => "validating",
            IssuanceStage::NumberReserved => "number_reserved",
            IssuanceStage::LinesComputed => "lines_computed",
            IssuanceStage::Settled => "settled",
            IssuanceStage::Persisted => "persisted",
            IssuanceStage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Category of a rejected issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FailureKind {
    /// Bad command or reference. Fix the input.
    Validation,
    /// Numbering authorization cannot issue. Needs operator action.
    Numbering,
    /// Payments or credit terms do not settle the total.
    Settlement,
    /// Lost the race for the next number too many times.
    ConcurrencyConflict,
    /// Storage failure; nothing was committed.
    Persistence,
}

impl FailureKind {
    /// Whether the orchestrator re-runs the attempt on its own.
    pub fn is_retried(&self) -> bool {
        matches!(self, FailureKind::ConcurrencyConflict)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Validation => "validation",
            FailureKind::Numbering => "numbering",
            FailureKind::Settlement => "settlement",
            FailureKind::ConcurrencyConflict => "concurrency_conflict",
            FailureKind::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::Validation(_) => FailureKind::Validation,
            CoreError::Numbering(_) => FailureKind::Numbering,
            CoreError::Settlement(_) => FailureKind::Settlement,
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Structured result for callers that render messages instead of matching
/// on error types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IssuanceOutcome {
    pub success: bool,
    pub kind: Option<FailureKind>,
    pub message: String,
    pub invoice: Option<InvoiceDocument>,
}

impl IssuanceOutcome {
    pub fn succeeded(document: InvoiceDocument) -> Self {
        IssuanceOutcome {
            success: true,
            kind: None,
            message: format!("Invoice {} issued", document.invoice.invoice_number),
            invoice: Some(document),
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        IssuanceOutcome {
            success: false,
            kind: Some(kind),
            message: message.into(),
            invoice: None,
        }
    }
}

// =============================================================================
// Record Assembly
// =============================================================================

/// Builds the invoice, its sold lines and its payments.
///
/// `breakdown` must have been computed from `command.lines` so that
/// `breakdown.lines[i]` belongs to `command.lines[i]`.
pub fn build_document(
    command: &IssueInvoiceCommand,
    reservation: &Reservation,
    breakdown: &TaxBreakdown,
    settlement: &Settlement,
    issued_at: DateTime<Utc>,
) -> InvoiceDocument {
    let invoice_id = Uuid::new_v4().to_string();

    let invoice = Invoice {
        id: invoice_id.clone(),
        authorization_id: reservation.authorization_id.clone(),
        invoice_number: reservation.invoice_number.clone(),
        correlative: reservation.correlative,
        issue_date: command.date,
        customer_id: command.customer_id.clone(),
        user_id: command.session.user_id.clone(),
        cash_register_id: command.session.cash_register_id.clone(),
        discount_id: command.discount.as_ref().map(|d| d.discount_id.clone()),
        discount_bps: command.discount_bps(),
        subtotal_cents: breakdown.subtotal.cents(),
        discount_cents: breakdown.total_discount.cents(),
        tax_cents: breakdown.total_taxes.cents(),
        total_cents: breakdown.total.cents(),
        exempt_cents: breakdown.exempt.cents(),
        taxed_15_cents: breakdown.taxed_15.cents(),
        tax_15_cents: breakdown.tax_15.cents(),
        taxed_18_cents: breakdown.taxed_18.cents(),
        tax_18_cents: breakdown.tax_18.cents(),
        taxed_other_cents: breakdown.taxed_other().cents(),
        tax_other_cents: breakdown.tax_other().cents(),
        cash_received_cents: settlement.cash_received.cents(),
        change_cents: settlement.change.cents(),
        status: settlement.status,
        outstanding_cents: settlement.outstanding.cents(),
        credit_days: settlement.credit_days,
        due_date: settlement.due_date,
        created_at: issued_at,
    };

    let lines = command
        .lines
        .iter()
        .zip(&breakdown.lines)
        .enumerate()
        .map(|(index, (line, amounts))| SoldLine {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.clone(),
            line_number: index as i64 + 1,
            product_id: line.product_id.clone(),
            description: line.description.clone(),
            quantity: line.quantity,
            tax_id: line.tax_id.clone(),
            tax_rate_bps: line.tax_rate.bps(),
            unit_price_cents: line.unit_price_cents,
            discount_cents: amounts.discount.cents(),
            tax_cents: amounts.tax.cents(),
            line_total_cents: amounts.after_discount.cents(),
        })
        .collect();

    let payments = command
        .payments
        .iter()
        .map(|tender| InvoicePayment {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.clone(),
            payment_type_id: tender.payment_type_id.clone(),
            amount_cents: tender.amount_cents,
        })
        .collect();

    InvoiceDocument {
        invoice,
        lines,
        payments,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettlementError;
    use crate::ledger::{settle, SettlementRequest};
    use crate::tax::compute_breakdown;
    use crate::types::{CartLine, DiscountSelection, SessionContext, SettlementStatus, TaxRate, Tender};
    use chrono::NaiveDate;

    fn command() -> IssueInvoiceCommand {
        IssueInvoiceCommand {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            customer_id: "customer".into(),
            authorization_id: "auth".into(),
            session: SessionContext {
                user_id: "cashier".into(),
                cash_register_id: Some("register-1".into()),
            },
            discount: Some(DiscountSelection {
                discount_id: "ten".into(),
                percentage_bps: 1000,
            }),
            lines: vec![CartLine {
                product_id: "p1".into(),
                description: "Coffee 1lb".into(),
                quantity: 1,
                tax_id: "isv15".into(),
                tax_rate: TaxRate::ISV_15,
                unit_price_cents: 10000,
            }],
            payments: vec![Tender {
                payment_type_id: "cash".into(),
                amount_cents: 10350,
            }],
            is_credit: false,
            credit_days: None,
        }
    }

    #[test]
    fn test_build_document_carries_breakdown_and_settlement() {
        let command = command();
        let reservation = Reservation {
            authorization_id: "auth".into(),
            correlative: 1,
            invoice_number: "000-002-01-00000001".into(),
        };
        let breakdown = compute_breakdown(&command.lines, command.discount_bps());
        let settlement = settle(&SettlementRequest {
            total: breakdown.total,
            paid: command.total_paid(),
            is_credit: false,
            credit_days: None,
            customer_id: &command.customer_id,
            walk_in_customer_id: "walk-in",
            date: command.date,
        })
        .unwrap();

        let doc = build_document(&command, &reservation, &breakdown, &settlement, Utc::now());

        assert_eq!(doc.invoice.invoice_number, "000-002-01-00000001");
        assert_eq!(doc.invoice.total_cents, 10350);
        assert_eq!(doc.invoice.subtotal_cents + doc.invoice.tax_cents, 10350);
        assert_eq!(doc.invoice.discount_cents, 1000);
        assert_eq!(doc.invoice.status, SettlementStatus::Paid);
        assert_eq!(doc.invoice.discount_id.as_deref(), Some("ten"));
        assert_eq!(doc.invoice.cash_register_id.as_deref(), Some("register-1"));

        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].line_number, 1);
        assert_eq!(doc.lines[0].line_total_cents, 9000);
        assert_eq!(doc.lines[0].tax_cents, 1350);
        assert_eq!(doc.lines[0].invoice_id, doc.invoice.id);

        assert_eq!(doc.payments.len(), 1);
        assert_eq!(doc.payments[0].amount_cents, 10350);
    }

    #[test]
    fn test_failure_kinds() {
        let err: CoreError = SettlementError::MissingCreditTerms.into();
        assert_eq!(err.kind(), FailureKind::Settlement);
        assert!(FailureKind::ConcurrencyConflict.is_retried());
        assert!(!FailureKind::Numbering.is_retried());
        assert_eq!(FailureKind::ConcurrencyConflict.to_string(), "concurrency_conflict");
    }

    #[test]
    fn test_outcome_constructors() {
        let outcome = IssuanceOutcome::failed(FailureKind::Validation, "cart is empty");
        assert!(!outcome.success);
        assert_eq!(outcome.kind, Some(FailureKind::Validation));
        assert!(outcome.invoice.is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(IssuanceStage::NumberReserved.to_string(), "number_reserved");
        assert_eq!(IssuanceStage::Committed.to_string(), "committed");
    }
}
