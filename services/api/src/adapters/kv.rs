//! services/api/src/adapters/kv.rs
//!
//! The SQLite implementation of the `KeyValueStore` port. Each logical key is
//! one row; a write replaces the whole serialized collection.

use async_trait::async_trait;
use sanctuary_core::ports::{KeyValueStore, PortError, PortResult};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `KeyValueStore` port.
#[derive(Clone)]
pub struct SqliteKvAdapter {
    pool: SqlitePool,
}

impl SqliteKvAdapter {
    /// Creates a new `SqliteKvAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for SqliteKvAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single connection, so every query sees the same in-memory database.
    async fn adapter() -> SqliteKvAdapter {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let adapter = SqliteKvAdapter::new(pool);
        adapter.run_migrations().await.unwrap();
        adapter
    }

    #[tokio::test]
    async fn set_overwrites_and_remove_deletes() {
        let kv = adapter().await;
        assert_eq!(kv.get("sanctuary_users").await.unwrap(), None);

        kv.set("sanctuary_users", "[]").await.unwrap();
        kv.set("sanctuary_users", "[{\"email\":\"a@b.c\"}]").await.unwrap();
        assert_eq!(
            kv.get("sanctuary_users").await.unwrap().as_deref(),
            Some("[{\"email\":\"a@b.c\"}]")
        );

        kv.remove("sanctuary_users").await.unwrap();
        kv.remove("sanctuary_users").await.unwrap();
        assert_eq!(kv.get("sanctuary_users").await.unwrap(), None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let kv = adapter().await;
        kv.run_migrations().await.unwrap();
    }
}
