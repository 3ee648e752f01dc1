//! # Repository Module
//!
//! Database repository implementations for Reserva TRIP.
//!
//! ```text
//! StateStore / seed binary
//!      │
//!      │  db.kv().put("reserva-trip-data", json)
//!      ▼
//! KvRepository
//! ├── get(&self, key)
//! ├── put(&self, key, value)
//! ├── remove(&self, key)
//! └── keys(&self)
//!      │
//!      ▼
//! SQLite kv_store table
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KvRepository`] - Key/value documents

pub mod kv;
