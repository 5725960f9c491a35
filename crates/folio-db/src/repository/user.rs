//! # User Repository
//!
//! Cashier accounts. The issuance engine only checks that the session user
//! exists and is active.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use folio_core::validation::validate_required;
use folio_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn insert(&self, user: &User) -> DbResult<User> {
        validate_required("username", &user.username)?;

        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query("INSERT INTO users (id, username, is_active, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(user.is_active)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(user.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        fetch_by_id(&self.pool, id).await
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, is_active, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

pub(crate) async fn fetch_by_id<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: &str,
) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, is_active, created_at FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}
