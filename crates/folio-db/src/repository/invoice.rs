//! # Invoice Repository
//!
//! Read side of issued invoices, plus the inserts the issuer runs inside its
//! transaction.
//!
//! ## Consumers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ticket / PDF rendering  ──► get_document(id)                          │
//! │  Receivable views        ──► get_by_number / outstanding, due_date     │
//! │  Numbering audit         ──► list_by_authorization (by correlative)    │
//! │                                                                         │
//! │  None of these mutate invoice state.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::DbResult;
use folio_core::{Invoice, InvoiceDocument, InvoicePayment, SoldLine};

macro_rules! select_invoice {
    ($tail:literal) => {
        concat!(
            "SELECT id, authorization_id, invoice_number, correlative, issue_date, ",
            "customer_id, user_id, cash_register_id, discount_id, discount_bps, ",
            "subtotal_cents, discount_cents, tax_cents, total_cents, ",
            "exempt_cents, taxed_15_cents, tax_15_cents, taxed_18_cents, tax_18_cents, ",
            "taxed_other_cents, tax_other_cents, ",
            "cash_received_cents, change_cents, status, outstanding_cents, ",
            "credit_days, due_date, created_at ",
            "FROM invoices ",
            $tail
        )
    };
}

/// Repository for issued invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(select_invoice!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Looks an invoice up by its printed number.
    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(select_invoice!("WHERE invoice_number = ?1"))
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Sold lines in printed order.
    pub async fn get_lines(&self, invoice_id: &str) -> DbResult<Vec<SoldLine>> {
        let lines = sqlx::query_as::<_, SoldLine>(
            r#"
            SELECT id, invoice_id, line_number, product_id, description, quantity,
                   tax_id, tax_rate_bps, unit_price_cents, discount_cents,
                   tax_cents, line_total_cents
            FROM invoice_lines
            WHERE invoice_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    pub async fn get_payments(&self, invoice_id: &str) -> DbResult<Vec<InvoicePayment>> {
        let payments = sqlx::query_as::<_, InvoicePayment>(
            r#"
            SELECT id, invoice_id, payment_type_id, amount_cents
            FROM invoice_payments
            WHERE invoice_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Invoice with its lines and payments, as renderers need it.
    pub async fn get_document(&self, id: &str) -> DbResult<Option<InvoiceDocument>> {
        let Some(invoice) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let lines = self.get_lines(&invoice.id).await?;
        let payments = self.get_payments(&invoice.id).await?;

        Ok(Some(InvoiceDocument {
            invoice,
            lines,
            payments,
        }))
    }

    /// Invoices issued from one authorization, by correlative.
    pub async fn list_by_authorization(&self, authorization_id: &str) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(select_invoice!(
            "WHERE authorization_id = ?1 ORDER BY correlative"
        ))
        .bind(authorization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    pub async fn count_by_authorization(&self, authorization_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE authorization_id = ?1")
                .bind(authorization_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Transactional Inserts
// =============================================================================

pub(crate) async fn insert_invoice<'e, E: SqliteExecutor<'e>>(
    executor: E,
    invoice: &Invoice,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, authorization_id, invoice_number, correlative, issue_date,
            customer_id, user_id, cash_register_id, discount_id, discount_bps,
            subtotal_cents, discount_cents, tax_cents, total_cents,
            exempt_cents, taxed_15_cents, tax_15_cents, taxed_18_cents, tax_18_cents,
            taxed_other_cents, tax_other_cents,
            cash_received_cents, change_cents, status, outstanding_cents,
            credit_days, due_date, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18, ?19,
            ?20, ?21,
            ?22, ?23, ?24, ?25,
            ?26, ?27, ?28
        )
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.authorization_id)
    .bind(&invoice.invoice_number)
    .bind(invoice.correlative)
    .bind(invoice.issue_date)
    .bind(&invoice.customer_id)
    .bind(&invoice.user_id)
    .bind(&invoice.cash_register_id)
    .bind(&invoice.discount_id)
    .bind(invoice.discount_bps)
    .bind(invoice.subtotal_cents)
    .bind(invoice.discount_cents)
    .bind(invoice.tax_cents)
    .bind(invoice.total_cents)
    .bind(invoice.exempt_cents)
    .bind(invoice.taxed_15_cents)
    .bind(invoice.tax_15_cents)
    .bind(invoice.taxed_18_cents)
    .bind(invoice.tax_18_cents)
    .bind(invoice.taxed_other_cents)
    .bind(invoice.tax_other_cents)
    .bind(invoice.cash_received_cents)
    .bind(invoice.change_cents)
    .bind(invoice.status)
    .bind(invoice.outstanding_cents)
    .bind(invoice.credit_days)
    .bind(invoice.due_date)
    .bind(invoice.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_line<'e, E: SqliteExecutor<'e>>(
    executor: E,
    line: &SoldLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_lines (
            id, invoice_id, line_number, product_id, description, quantity,
            tax_id, tax_rate_bps, unit_price_cents, discount_cents,
            tax_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&line.id)
    .bind(&line.invoice_id)
    .bind(line.line_number)
    .bind(&line.product_id)
    .bind(&line.description)
    .bind(line.quantity)
    .bind(&line.tax_id)
    .bind(line.tax_rate_bps)
    .bind(line.unit_price_cents)
    .bind(line.discount_cents)
    .bind(line.tax_cents)
    .bind(line.line_total_cents)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_payment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    payment: &InvoicePayment,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_payments (id, invoice_id, payment_type_id, amount_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.invoice_id)
    .bind(&payment.payment_type_id)
    .bind(payment.amount_cents)
    .execute(executor)
    .await?;

    Ok(())
}
