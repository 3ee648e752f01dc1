//! # Key/Value Repository
//!
//! String documents addressed by key, the local-storage model the sales
//! tracker persists into.
//!
//! ## Table
//! ```text
//! kv_store
//! ├── key         TEXT PRIMARY KEY
//! ├── value       TEXT         (a JSON document)
//! └── updated_at  TEXT         (RFC 3339, set on every write)
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::storage::BlobStore;

/// Repository for key/value documents.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "Read key");
        Ok(value)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Wrote key");
        Ok(())
    }

    /// Deletes `key`. Returns whether anything was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "Removed key");
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BlobStore for KvRepository {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        KvRepository::get(self, key).await
    }

    async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        KvRepository::put(self, key, value).await
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        KvRepository::remove(self, key).await.map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> KvRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().kv()
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let kv = repo().await;
        assert_eq!(kv.get("a").await.unwrap(), None);

        kv.put("a", "[1]").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("[1]"));

        kv.put("a", "[2]").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(kv.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove() {
        let kv = repo().await;
        kv.put("b", "{}").await.unwrap();

        assert!(kv.remove("b").await.unwrap());
        assert!(!kv.remove("b").await.unwrap());
        assert_eq!(kv.get("b").await.unwrap(), None);
    }
}
