//! # Application State
//!
//! Focused state types instead of one big `AppState`:
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │   LedgerState    │ │   StorageState   │ │    ConfigState       │
//! │                  │ │                  │ │                      │
//! │  • Sales ledger  │ │  • State store   │ │  • Storage key       │
//! │  • Dirty flag    │ │  • SQLite pool   │ │  • Auto-save period  │
//! │                  │ │                  │ │  • Currency symbol   │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//! ```
//!
//! Each command takes only the state it needs.

mod config;
mod ledger;
mod storage;

pub use config::{ConfigError, ConfigState};
pub use ledger::LedgerState;
pub use storage::{Backend, StorageState};
