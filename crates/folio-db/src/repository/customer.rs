//! # Customer Repository
//!
//! Existence lookups for the issuance engine plus `insert` for seeding.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use folio_core::validation::validate_required;
use folio_core::Customer;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        validate_required("name", &customer.name)?;

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, rtn, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.rtn)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        fetch_by_id(&self.pool, id).await
    }
}

pub(crate) async fn fetch_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        "SELECT id, name, rtn, is_active, created_at FROM customers WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{customer, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let acme = customer("Acme Hardware", Some("08011999000123"));
        db.customers().insert(&acme).await.unwrap();

        let loaded = db.customers().get_by_id(&acme.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Acme Hardware");
        assert_eq!(loaded.rtn.as_deref(), Some("08011999000123"));
        assert!(db.customers().get_by_id("nobody").await.unwrap().is_none());
    }
}
