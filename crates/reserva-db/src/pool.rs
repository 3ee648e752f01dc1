//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  App startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.kv() ──► KvRepository ──► kv_store table                           │
//! │                                                                         │
//! │  The interactive session and the auto-save task share one pool.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use directories::ProjectDirs;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::kv::KvRepository;

// =============================================================================
// Configuration
// =============================================================================

/// `reserva.db` in the platform data directory, or in the working directory
/// when the platform has none.
///
/// - **macOS**: `~/Library/Application Support/com.reserva.trip/reserva.db`
/// - **Windows**: `%APPDATA%\reserva\trip\data\reserva.db`
/// - **Linux**: `~/.local/share/trip/reserva.db`
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "reserva", "trip")
        .map(|dirs| dirs.data_dir().join("reserva.db"))
        .unwrap_or_else(|| PathBuf::from("reserva.db"))
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `None` for a private in-memory
    /// database.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 4 (one user plus the auto-save task)
    pub max_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,
}

impl DbConfig {
    /// Creates a configuration for the given file. The file is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Creates an in-memory database configuration.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            // each connection would otherwise see its own empty database
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database, builds the pool and applies
    /// pending migrations.
    ///
    /// File databases use WAL journaling with NORMAL synchronous mode.
    /// Parent directories are created on demand.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let connect_options = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "Initializing database connection");
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                    }
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .create_if_missing(true)
            }
            None => {
                info!("Initializing in-memory database");
                SqliteConnectOptions::new().in_memory(true)
            }
        };

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// Returns the key/value repository.
    pub fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    /// Closes the connection pool. Later repository calls fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().put("k", "[]").await.unwrap();
        assert_eq!(db.kv().get("k").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("reserva-pool-{}", std::process::id()));
        let path = dir.join("nested").join("reserva.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.kv().put("k", "[1]").await.unwrap();
        db.close().await;
        assert!(path.exists());

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.kv().get("k").await.unwrap().as_deref(), Some("[1]"));
        reopened.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("reserva.db"));
        assert_eq!(DbConfig::new(&path).database_path, Some(path));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(matches!(
            db.kv().get("k").await,
            Err(DbError::ConnectionFailed(_))
        ));
    }
}
