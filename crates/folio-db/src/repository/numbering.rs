//! # Numbering Authorization Repository
//!
//! Storage for numbering authorizations ("CAI") and the single mutating
//! step of the registry: committing a reservation.
//!
//! ## Commit Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Naive (unsafe):   read current ─► ... ─► UPDATE SET current = n + 1    │
//! │                    two cashiers read the same n → duplicate number      │
//! │                                                                         │
//! │  Here:             UPDATE ... SET current = current + 1                 │
//! │                    WHERE id = ? AND current = <reserved n>              │
//! │                      AND is_active = 1 AND current <= final             │
//! │                                                                         │
//! │                    1 row  → this transaction owns n                     │
//! │                    0 rows → someone else took n: conflict, retry        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The update runs in the same transaction as the invoice insert, so a
//! failed issuance never consumes a number.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use folio_core::numbering::{NumberingAuthorization, Reservation};

macro_rules! select_authorization {
    ($tail:literal) => {
        concat!(
            "SELECT id, cai, prefix, ",
            "initial_correlative, final_correlative, current_correlative, ",
            "remaining_invoices, valid_from, valid_to, is_active, ",
            "created_at, updated_at ",
            "FROM numbering_authorizations ",
            $tail
        )
    };
}

/// Repository for numbering authorizations.
#[derive(Debug, Clone)]
pub struct NumberingRepository {
    pool: SqlitePool,
}

impl NumberingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NumberingRepository { pool }
    }

    /// Inserts an authorization.
    ///
    /// When it is active, every other authorization is deactivated in the
    /// same transaction so at most one stays active.
    pub async fn insert(
        &self,
        authorization: &NumberingAuthorization,
    ) -> DbResult<NumberingAuthorization> {
        authorization.validate_invariants()?;

        debug!(
            id = %authorization.id,
            prefix = %authorization.prefix,
            active = authorization.is_active,
            "Inserting numbering authorization"
        );

        let mut tx = self.pool.begin().await?;

        if authorization.is_active {
            deactivate_all(&mut *tx, authorization.updated_at).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO numbering_authorizations (
                id, cai, prefix,
                initial_correlative, final_correlative, current_correlative,
                remaining_invoices, valid_from, valid_to, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&authorization.id)
        .bind(&authorization.cai)
        .bind(&authorization.prefix)
        .bind(authorization.initial_correlative)
        .bind(authorization.final_correlative)
        .bind(authorization.current_correlative)
        .bind(authorization.remaining_invoices)
        .bind(authorization.valid_from)
        .bind(authorization.valid_to)
        .bind(authorization.is_active)
        .bind(authorization.created_at)
        .bind(authorization.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(authorization.clone())
    }

    /// Makes `id` the only active authorization.
    pub async fn activate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        deactivate_all(&mut *tx, now).await?;

        let result = sqlx::query(
            "UPDATE numbering_authorizations SET is_active = 1, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("NumberingAuthorization", id));
        }

        tx.commit().await?;

        info!(id = %id, "Numbering authorization activated");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<NumberingAuthorization>> {
        fetch_by_id(&self.pool, id).await
    }

    /// The authorization currently used for new issuance, if any.
    pub async fn get_active(&self) -> DbResult<Option<NumberingAuthorization>> {
        let authorization = sqlx::query_as::<_, NumberingAuthorization>(select_authorization!(
            "WHERE is_active = 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(authorization)
    }

    /// All authorizations, newest validity window first.
    pub async fn list(&self) -> DbResult<Vec<NumberingAuthorization>> {
        let authorizations = sqlx::query_as::<_, NumberingAuthorization>(select_authorization!(
            "ORDER BY valid_from DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(authorizations)
    }
}

async fn deactivate_all<'e, E: SqliteExecutor<'e>>(executor: E, now: DateTime<Utc>) -> DbResult<()> {
    sqlx::query(
        "UPDATE numbering_authorizations SET is_active = 0, updated_at = ?1 WHERE is_active = 1",
    )
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Loads an authorization through any executor (pool or open transaction).
pub(crate) async fn fetch_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> DbResult<Option<NumberingAuthorization>> {
    let authorization =
        sqlx::query_as::<_, NumberingAuthorization>(select_authorization!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

    Ok(authorization)
}

/// No-op write that takes SQLite's write lock as the transaction's first
/// statement, so the snapshot read afterwards cannot go stale before commit.
pub(crate) async fn claim<'e, E: SqliteExecutor<'e>>(executor: E, id: &str) -> DbResult<()> {
    sqlx::query("UPDATE numbering_authorizations SET updated_at = updated_at WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Advances the counter past `reservation` if nobody else did first.
///
/// Returns `false` when the row no longer matches the reservation.
pub(crate) async fn commit_reservation<'e, E: SqliteExecutor<'e>>(
    executor: E,
    reservation: &Reservation,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE numbering_authorizations
        SET current_correlative = current_correlative + 1,
            remaining_invoices = remaining_invoices - 1,
            updated_at = ?3
        WHERE id = ?1
          AND current_correlative = ?2
          AND is_active = 1
          AND current_correlative <= final_correlative
        "#,
    )
    .bind(&reservation.authorization_id)
    .bind(reservation.correlative)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
