//! # Invoice Issuer
//!
//! The atomic "issue invoice" unit of work: reserve a number, compute the
//! breakdown, settle, persist invoice + lines + payments, decrement stock,
//! and advance the authorization counter. Either all of it commits or none
//! of it does.
//!
//! ## Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier A ──┐                                                          │
//! │              ├──► per-authorization mutex (same process)                │
//! │  Cashier B ──┘         │                                                │
//! │                        ▼                                                │
//! │                  BEGIN; claim write lock (other processes wait)         │
//! │                  read authorization → reserve current                   │
//! │                  UPDATE ... WHERE current = reserved ──► 0 rows?        │
//! │                        │                                  │             │
//! │                        ▼                                  ▼             │
//! │                  insert rows, stock, COMMIT          ROLLBACK, backoff, │
//! │                                                      retry (bounded)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping an in-flight `issue` future drops its transaction, which rolls
//! back. A cancelled issuance never consumes a number.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::config::IssuanceSettings;
use crate::error::DbError;
use crate::repository::{customer, discount, invoice, numbering, product, user};
use folio_core::inventory::{plan_decrements, stock_after};
use folio_core::issuance::build_document;
use folio_core::ledger::{settle, SettlementRequest};
use folio_core::numbering::reserve_next;
use folio_core::tax::compute_breakdown;
use folio_core::validation::validate_command;
use folio_core::{
    CartLine, CoreError, FailureKind, InvoiceDocument, IssuanceOutcome, IssuanceStage,
    IssueInvoiceCommand, NumberingError, SettlementError, ValidationError,
};

// =============================================================================
// Errors
// =============================================================================

/// Why an issuance was rejected. Nothing was committed in any case.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// Lost the race for the next number on every attempt.
    #[error("Invoice number still contended after {attempts} attempts")]
    ConcurrencyConflict { attempts: u32 },

    #[error("Persistence failed: {0}")]
    Persistence(DbError),
}

impl IssuanceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IssuanceError::Validation(_) => FailureKind::Validation,
            IssuanceError::Numbering(_) => FailureKind::Numbering,
            IssuanceError::Settlement(_) => FailureKind::Settlement,
            IssuanceError::ConcurrencyConflict { .. } => FailureKind::ConcurrencyConflict,
            IssuanceError::Persistence(_) => FailureKind::Persistence,
        }
    }
}

impl From<CoreError> for IssuanceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => IssuanceError::Validation(e),
            CoreError::Numbering(e) => IssuanceError::Numbering(e),
            CoreError::Settlement(e) => IssuanceError::Settlement(e),
        }
    }
}

impl From<DbError> for IssuanceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(e) => IssuanceError::Validation(e),
            other => IssuanceError::Persistence(other),
        }
    }
}

/// Result of one attempt: either worth retrying or final.
#[derive(Debug)]
enum AttemptError {
    Conflict(String),
    Rejected(IssuanceError),
}

/// Another writer took the number we reserved.
fn is_number_collision(err: &DbError) -> bool {
    match err {
        DbError::UniqueViolation { field, .. } => {
            field.contains("invoices.invoice_number") || field.contains("invoices.correlative")
        }
        _ => false,
    }
}

impl From<DbError> for AttemptError {
    fn from(err: DbError) -> Self {
        if err.is_retryable() || is_number_collision(&err) {
            AttemptError::Conflict(err.to_string())
        } else {
            AttemptError::Rejected(err.into())
        }
    }
}

impl From<sqlx::Error> for AttemptError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<ValidationError> for AttemptError {
    fn from(err: ValidationError) -> Self {
        AttemptError::Rejected(err.into())
    }
}

impl From<NumberingError> for AttemptError {
    fn from(err: NumberingError) -> Self {
        AttemptError::Rejected(err.into())
    }
}

impl From<SettlementError> for AttemptError {
    fn from(err: SettlementError) -> Self {
        AttemptError::Rejected(err.into())
    }
}

// =============================================================================
// Per-Authorization Locks
// =============================================================================

/// Serializes issuers of this process that draw from the same authorization.
/// Issuers in other processes are serialized by SQLite itself.
#[derive(Debug, Default)]
struct AuthorizationLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AuthorizationLocks {
    async fn acquire(&self, authorization_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries are only cloned under the map lock, so a count of one
            // means nobody holds or waits on that authorization.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(authorization_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

// =============================================================================
// Issuer
// =============================================================================

/// Issues invoices. Clone it freely; clones share the lock table.
#[derive(Debug, Clone)]
pub struct InvoiceIssuer {
    pool: SqlitePool,
    settings: IssuanceSettings,
    locks: Arc<AuthorizationLocks>,
}

impl InvoiceIssuer {
    pub fn new(pool: SqlitePool, settings: IssuanceSettings) -> Self {
        InvoiceIssuer {
            pool,
            settings,
            locks: Arc::new(AuthorizationLocks::default()),
        }
    }

    pub fn settings(&self) -> &IssuanceSettings {
        &self.settings
    }

    /// Issues one invoice.
    ///
    /// ## Returns
    /// * `Ok(InvoiceDocument)` - committed invoice with lines and payments
    /// * `Err(IssuanceError)` - nothing was written
    pub async fn issue(
        &self,
        command: &IssueInvoiceCommand,
    ) -> Result<InvoiceDocument, IssuanceError> {
        debug!(
            stage = %IssuanceStage::Validating,
            authorization_id = %command.authorization_id,
            lines = command.lines.len(),
            "Issuing invoice"
        );

        if let Err(err) = validate_command(command) {
            warn!(kind = %FailureKind::Validation, error = %err, "Invoice command rejected");
            return Err(err.into());
        }

        let mut backoff = self.settings.backoff();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let result = {
                let _guard = self.locks.acquire(&command.authorization_id).await;
                self.try_issue(command).await
            };

            match result {
                Ok(document) => {
                    info!(
                        stage = %IssuanceStage::Committed,
                        invoice_number = %document.invoice.invoice_number,
                        total = document.invoice.total_cents,
                        status = ?document.invoice.status,
                        attempts,
                        "Invoice issued"
                    );
                    return Ok(document);
                }
                Err(AttemptError::Rejected(err)) => {
                    warn!(kind = %err.kind(), error = %err, "Invoice issuance rejected");
                    return Err(err);
                }
                Err(AttemptError::Conflict(reason)) => {
                    if attempts > self.settings.max_conflict_retries {
                        warn!(attempts, reason = %reason, "Giving up on contended authorization");
                        return Err(IssuanceError::ConcurrencyConflict { attempts });
                    }

                    let delay = backoff
                        .next_backoff()
                        .unwrap_or(Duration::from_millis(self.settings.max_backoff_ms));
                    debug!(
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "Numbering conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Same as [`issue`](Self::issue), flattened into the structured outcome
    /// the presentation layer renders.
    pub async fn issue_outcome(&self, command: &IssueInvoiceCommand) -> IssuanceOutcome {
        match self.issue(command).await {
            Ok(document) => IssuanceOutcome::succeeded(document),
            Err(err) => IssuanceOutcome::failed(err.kind(), err.to_string()),
        }
    }

    /// One attempt inside one transaction. Any early return drops `tx`,
    /// which rolls everything back.
    async fn try_issue(
        &self,
        command: &IssueInvoiceCommand,
    ) -> Result<InvoiceDocument, AttemptError> {
        let mut tx = self.pool.begin().await?;

        numbering::claim(&mut *tx, &command.authorization_id).await?;
        check_references(&mut tx, command).await?;

        let authorization = numbering::fetch_by_id(&mut *tx, &command.authorization_id).await?;
        let reservation = reserve_next(&command.authorization_id, authorization.as_ref(), command.date)?;
        debug!(
            stage = %IssuanceStage::NumberReserved,
            invoice_number = %reservation.invoice_number,
            "Number reserved"
        );

        let breakdown = compute_breakdown(&command.lines, command.discount_bps());
        debug!(
            stage = %IssuanceStage::LinesComputed,
            subtotal = breakdown.subtotal.cents(),
            taxes = breakdown.total_taxes.cents(),
            total = breakdown.total.cents(),
            "Lines computed"
        );

        let settlement = settle(&SettlementRequest {
            total: breakdown.total,
            paid: command.total_paid(),
            is_credit: command.is_credit,
            credit_days: command.credit_days,
            customer_id: &command.customer_id,
            walk_in_customer_id: &self.settings.walk_in_customer_id,
            date: command.date,
        })?;
        debug!(
            stage = %IssuanceStage::Settled,
            status = ?settlement.status,
            outstanding = settlement.outstanding.cents(),
            "Settled"
        );

        let now = Utc::now();
        let document = build_document(command, &reservation, &breakdown, &settlement, now);

        if !numbering::commit_reservation(&mut *tx, &reservation, now).await? {
            return Err(AttemptError::Conflict(format!(
                "correlative {} already taken",
                reservation.correlative
            )));
        }

        invoice::insert_invoice(&mut *tx, &document.invoice).await?;
        for line in &document.lines {
            invoice::insert_line(&mut *tx, line).await?;
        }
        for payment in &document.payments {
            invoice::insert_payment(&mut *tx, payment).await?;
        }

        self.adjust_stock(&mut tx, &command.lines, now).await?;
        debug!(
            stage = %IssuanceStage::Persisted,
            invoice_id = %document.invoice.id,
            "Invoice rows written"
        );

        tx.commit().await?;

        Ok(document)
    }

    /// Decrements stock for every sold product, clamped at zero.
    async fn adjust_stock(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        lines: &[CartLine],
        now: DateTime<Utc>,
    ) -> Result<(), AttemptError> {
        for decrement in plan_decrements(lines) {
            match product::fetch_stock(&mut **tx, &decrement.product_id).await? {
                Some(current) => {
                    let remaining = stock_after(current, decrement.quantity);
                    product::set_stock(&mut **tx, &decrement.product_id, remaining, now).await?;
                    debug!(
                        product_id = %decrement.product_id,
                        sold = decrement.quantity,
                        before = current,
                        after = remaining,
                        "Stock adjusted"
                    );
                }
                None if self.settings.strict_inventory => {
                    return Err(ValidationError::unknown("Product", &decrement.product_id).into());
                }
                None => {
                    warn!(
                        product_id = %decrement.product_id,
                        "Sold product not in catalog, stock left unchanged"
                    );
                }
            }
        }

        Ok(())
    }
}

/// Customer, cashier and discount must exist (and be active) at issuance.
async fn check_references(
    tx: &mut Transaction<'static, Sqlite>,
    command: &IssueInvoiceCommand,
) -> Result<(), AttemptError> {
    match customer::fetch_by_id(&mut **tx, &command.customer_id).await? {
        Some(found) if found.is_active => {}
        _ => return Err(ValidationError::unknown("Customer", &command.customer_id).into()),
    }

    match user::fetch_by_id(&mut **tx, &command.session.user_id).await? {
        Some(found) if found.is_active => {}
        _ => return Err(ValidationError::unknown("User", &command.session.user_id).into()),
    }

    if let Some(selection) = &command.discount {
        let stored = match discount::fetch_by_id(&mut **tx, &selection.discount_id).await? {
            Some(found) if found.is_active => found,
            _ => return Err(ValidationError::unknown("Discount", &selection.discount_id).into()),
        };

        if stored.percentage_bps != selection.percentage_bps {
            return Err(ValidationError::InvalidFormat {
                field: "discount.percentage_bps".to_string(),
                reason: format!(
                    "{} does not match stored {}",
                    selection.percentage_bps, stored.percentage_bps
                ),
            }
            .into());
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
