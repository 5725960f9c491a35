//! # Product Repository
//!
//! The engine reads products for price, tax and stock, and decrements stock
//! when an invoice commits. Catalog maintenance lives elsewhere; `insert`
//! exists for seeding and tests.
//!
//! ## Stock Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Inside the issuance transaction (write lock already held):         │
//! │                                                                     │
//! │    stock = fetch_stock(product)          10                         │
//! │    new   = stock_after(stock, sold)      max(0, 10 − 12) = 0        │
//! │    set_stock(product, new)                                          │
//! │                                                                     │
//! │  Never negative: the clamp lives in folio-core, the CHECK in SQL.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use folio_core::validation::{validate_price_cents, validate_product_name, validate_sku, validate_tax_rate_bps};
use folio_core::Product;

macro_rules! select_product {
    ($tail:literal) => {
        concat!(
            "SELECT id, sku, name, price_cents, tax_rate_bps, current_stock, ",
            "is_active, created_at, updated_at ",
            "FROM products ",
            $tail
        )
    };
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_sku("COFFEE-1LB").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_product!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_product!("WHERE sku = ?1"))
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        validate_sku(&product.sku)?;
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_tax_rate_bps(product.tax_rate_bps)?;

        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price_cents, tax_rate_bps, current_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Current stock of a product, `None` if the product does not exist.
pub(crate) async fn fetch_stock<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(stock)
}

/// Writes an absolute stock level.
pub(crate) async fn set_stock<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
    stock: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE products SET current_stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(now)
            .execute(executor)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, test_db};
    use folio_core::TaxRate;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.products();

        let coffee = product("COFFEE-1LB", 10000, TaxRate::ISV_15, 10);
        repo.insert(&coffee).await.unwrap();

        let by_id = repo.get_by_id(&coffee.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "COFFEE-1LB");
        assert_eq!(by_id.tax_rate(), TaxRate::ISV_15);
        assert_eq!(by_id.price().cents(), 10000);

        let by_sku = repo.get_by_sku("COFFEE-1LB").await.unwrap().unwrap();
        assert_eq!(by_sku.id, coffee.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("DUP", 100, TaxRate::EXEMPT, 1)).await.unwrap();
        let result = repo.insert(&product("DUP", 200, TaxRate::EXEMPT, 1)).await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let db = test_db().await;
        let result = db
            .products()
            .insert(&product("has space", 100, TaxRate::EXEMPT, 1))
            .await;

        assert!(matches!(result, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stock_helpers() {
        let db = test_db().await;
        let tea = product("TEA", 500, TaxRate::EXEMPT, 7);
        db.products().insert(&tea).await.unwrap();

        assert_eq!(fetch_stock(db.pool(), &tea.id).await.unwrap(), Some(7));
        assert_eq!(fetch_stock(db.pool(), "missing").await.unwrap(), None);

        set_stock(db.pool(), &tea.id, 3, Utc::now()).await.unwrap();
        assert_eq!(fetch_stock(db.pool(), &tea.id).await.unwrap(), Some(3));

        assert!(matches!(
            set_stock(db.pool(), "missing", 1, Utc::now()).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
