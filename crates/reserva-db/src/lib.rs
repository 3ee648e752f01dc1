//! # reserva-db: Persistence Layer for Reserva TRIP
//!
//! Local storage for the sales ledger. SQLite holds one JSON document per
//! key, the same model as a browser's local storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reserva TRIP Data Flow                             │
//! │                                                                         │
//! │  CLI shell (explicit save, auto-save tick, startup load)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   reserva-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │   │
//! │  │   │  StateStore  │──►│  BlobStore   │◄──│   KvRepository   │   │   │
//! │  │   │ (snapshot.rs)│   │ (storage.rs) │   │  (SQLite table)  │   │   │
//! │  │   └──────────────┘   └──────────────┘   └──────────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/reserva/reserva.db                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The key/value repository
//! - [`storage`] - The `BlobStore` capability and an in-memory store
//! - [`snapshot`] - The persisted-state document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reserva_db::{Database, DbConfig, StateStore};
//!
//! let db = Database::new(DbConfig::new("reserva.db")).await?;
//! let store = StateStore::new(Arc::new(db.kv()));
//! store.save(&ledger).await?;
//! let restored = store.load_ledger().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{default_database_path, Database, DbConfig};
pub use repository::kv::KvRepository;
pub use snapshot::{PersistedState, StateStore, STORAGE_KEY};
pub use storage::{BlobStore, MemoryStore};
