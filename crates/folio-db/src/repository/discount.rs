//! # Discount Repository
//!
//! Named cart discounts. An issuance that names a discount must match its
//! stored percentage.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use folio_core::validation::{validate_discount_bps, validate_required};
use folio_core::Discount;

#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    pub async fn insert(&self, discount: &Discount) -> DbResult<Discount> {
        validate_required("name", &discount.name)?;
        validate_discount_bps(discount.percentage_bps)?;

        debug!(id = %discount.id, bps = discount.percentage_bps, "Inserting discount");

        sqlx::query(
            r#"
            INSERT INTO discounts (id, name, percentage_bps, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.name)
        .bind(discount.percentage_bps)
        .bind(discount.is_active)
        .bind(discount.created_at)
        .execute(&self.pool)
        .await?;

        Ok(discount.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        fetch_by_id(&self.pool, id).await
    }
}

pub(crate) async fn fetch_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> DbResult<Option<Discount>> {
    let discount = sqlx::query_as::<_, Discount>(
        "SELECT id, name, percentage_bps, is_active, created_at FROM discounts WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(discount)
}
