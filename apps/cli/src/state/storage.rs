//! # Storage State
//!
//! Wraps the persisted-state store for the application.
//!
//! The session and the auto-save task both write through this handle. The
//! SQLite pool is thread-safe, but two saves that overlap could finish out of
//! order, so every save path holds [`StorageState::lock_writes`] from taking
//! its snapshot until the write completes.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use reserva_core::Ledger;
use reserva_db::{BlobStore, Database, DbConfig, MemoryStore, PersistedState, StateStore};

use crate::error::ApiError;
use crate::state::ConfigState;

/// Where the state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Sqlite(PathBuf),
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

/// Application handle to local storage.
#[derive(Debug, Clone)]
pub struct StorageState {
    store: StateStore,
    db: Option<Database>,
    backend: Backend,
    writes: Arc<Mutex<()>>,
}

impl StorageState {
    /// Opens the SQLite database named by the configuration.
    pub async fn open(config: &ConfigState) -> Result<Self, ApiError> {
        let path = config.resolved_database_path();
        info!(?path, "Opening local storage");

        let db = Database::new(DbConfig::new(&path)).await?;
        let store = StateStore::with_key(Arc::new(db.kv()), config.storage_key.clone());

        Ok(StorageState {
            store,
            db: Some(db),
            backend: Backend::Sqlite(path),
            writes: Arc::new(Mutex::new(())),
        })
    }

    /// A process-local store; nothing survives exit.
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), key)
    }

    /// Any blob store under `key`.
    pub fn with_store(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        StorageState {
            store: StateStore::with_key(store, key),
            db: None,
            backend: Backend::Memory,
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn key(&self) -> &str {
        self.store.key()
    }

    /// Serializes writers. Shared by every clone of this handle.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Writes the ledger.
    pub async fn save(&self, ledger: &Ledger) -> Result<PersistedState, ApiError> {
        Ok(self.store.save(ledger).await?)
    }

    /// Reads the saved ledger, if any.
    pub async fn load(&self) -> Result<Option<Ledger>, ApiError> {
        Ok(self.store.load_ledger().await?)
    }

    /// Removes the saved ledger.
    pub async fn clear(&self) -> Result<(), ApiError> {
        Ok(self.store.clear().await?)
    }

    /// Closes the database pool, if any.
    pub async fn close(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let storage = StorageState::in_memory("k");
        assert!(storage.load().await.unwrap().is_none());

        let ledger = Ledger::with_demo_data(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let state = storage.save(&ledger).await.unwrap();
        assert_eq!(state.sales.len(), 3);

        assert_eq!(storage.load().await.unwrap(), Some(ledger));
        assert_eq!(storage.backend(), &Backend::Memory);
        assert_eq!(storage.key(), "k");

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_sqlite_file() {
        let path = std::env::temp_dir().join(format!("reserva-storage-{}.db", std::process::id()));
        let config = ConfigState {
            database_path: Some(path.clone()),
            ..ConfigState::default()
        };

        let storage = StorageState::open(&config).await.unwrap();
        storage.save(&Ledger::new()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(Ledger::new()));
        assert!(storage.backend().to_string().starts_with("sqlite"));
        storage.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
