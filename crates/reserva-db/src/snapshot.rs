//! # Persisted State
//!
//! The document the ledger is saved as, and the store that reads and writes it.
//!
//! ## Document Shape
//! ```json
//! {
//!   "sales": [ { "id": 1, "saleDate": "2024-06-01", ... } ],
//!   "timestamp": "2024-06-10T15:04:05.123Z",
//!   "version": "1.0.0"
//! }
//! ```
//!
//! ## Load Outcomes
//! ```text
//! key missing            → Ok(None)        caller keeps its current ledger
//! parses, records valid  → Ok(Some(..))    caller replaces its ledger
//! anything else          → Err(CorruptState)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reserva_core::{Ledger, SaleRecord, APP_VERSION};

use crate::error::{DbError, DbResult};
use crate::storage::BlobStore;

/// Storage key of the application state.
pub const STORAGE_KEY: &str = "reserva-trip-data";

/// The saved application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub sales: Vec<SaleRecord>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl PersistedState {
    /// Captures the ledger's records at `timestamp`.
    pub fn capture(ledger: &Ledger, timestamp: DateTime<Utc>) -> Self {
        PersistedState {
            sales: ledger.snapshot(),
            timestamp,
            version: APP_VERSION.to_string(),
        }
    }

    /// Rebuilds a ledger; the next id resumes after the largest stored id.
    pub fn into_ledger(self) -> Result<Ledger, reserva_core::CoreError> {
        Ledger::from_records(self.sales)
    }
}

/// Reads and writes [`PersistedState`] through a [`BlobStore`].
#[derive(Clone)]
pub struct StateStore {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").field("key", &self.key).finish()
    }
}

impl StateStore {
    /// A store under the default key.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        StateStore {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serializes the ledger and writes it. Returns the written document.
    pub async fn save(&self, ledger: &Ledger) -> DbResult<PersistedState> {
        let state = PersistedState::capture(ledger, Utc::now());
        let json = serde_json::to_string(&state)?;
        self.store.put(&self.key, &json).await?;

        info!(
            key = %self.key,
            sales = state.sales.len(),
            "Saved state"
        );
        Ok(state)
    }

    /// Reads the saved document, if present.
    pub async fn load(&self) -> DbResult<Option<PersistedState>> {
        let Some(json) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "No saved state");
            return Ok(None);
        };

        let state: PersistedState = serde_json::from_str(&json).map_err(|e| {
            warn!(key = %self.key, error = %e, "Saved state does not parse");
            DbError::corrupt(&self.key, e)
        })?;

        if state.version != APP_VERSION {
            warn!(
                key = %self.key,
                stored = %state.version,
                current = APP_VERSION,
                "Loading state written by a different version"
            );
        }

        Ok(Some(state))
    }

    /// Reads the saved document and rebuilds the ledger from it.
    pub async fn load_ledger(&self) -> DbResult<Option<Ledger>> {
        let Some(state) = self.load().await? else {
            return Ok(None);
        };

        let timestamp = state.timestamp;
        let ledger = state
            .into_ledger()
            .map_err(|e| DbError::corrupt(&self.key, e))?;

        info!(
            key = %self.key,
            sales = ledger.len(),
            next_id = ledger.next_id(),
            saved_at = %timestamp,
            "Loaded state"
        );
        Ok(Some(ledger))
    }

    /// Deletes the saved document.
    pub async fn clear(&self) -> DbResult<()> {
        self.store.remove(&self.key).await?;
        info!(key = %self.key, "Cleared saved state");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
