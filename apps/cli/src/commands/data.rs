//! # Data Commands
//!
//! Saving to local storage, and JSON export/import of the sales list.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use reserva_db::PersistedState;

use crate::commands::write_json_file;
use crate::error::ApiError;
use crate::state::{ConfigState, LedgerState, StorageState};

/// Default export file name: `ventas-YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("ventas-{}.json", date.format("%Y-%m-%d"))
}

/// Writes every sale as a JSON array and returns the path written.
pub fn export_sales(
    ledger: &LedgerState,
    config: &ConfigState,
    output: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let sales = ledger.with_ledger(|l| l.snapshot());
    let path = output
        .unwrap_or_else(|| config.export_path(&export_file_name(Utc::now().date_naive())));

    write_json_file(&path, &sales)?;

    info!(path = %path.display(), sales = sales.len(), "Sales exported");
    Ok(path)
}

/// Replaces the ledger with the sales in a JSON file.
///
/// A file that is not a valid list of sales leaves the ledger unchanged.
pub fn import_sales(ledger: &LedgerState, path: &Path) -> Result<usize, ApiError> {
    debug!(path = %path.display(), "import_sales command");

    let json = std::fs::read_to_string(path)?;
    let count = import_sales_json(ledger, &json)?;

    info!(path = %path.display(), sales = count, "Sales imported");
    Ok(count)
}

/// Replaces the ledger with the sales in a JSON string.
pub fn import_sales_json(ledger: &LedgerState, json: &str) -> Result<usize, ApiError> {
    Ok(ledger.mutate(|l| l.import_json(json))?)
}

/// Persists the ledger now, whether or not it changed.
pub async fn save_now(
    ledger: &LedgerState,
    storage: &StorageState,
) -> Result<PersistedState, ApiError> {
    debug!("save_now command");

    let _writing = storage.lock_writes().await;
    let snapshot = ledger
        .snapshot_if_dirty()
        .unwrap_or_else(|| ledger.snapshot());

    match storage.save(&snapshot).await {
        Ok(state) => Ok(state),
        Err(e) => {
            ledger.mark_dirty();
            Err(e)
        }
    }
}

/// Persists the ledger only if it has unsaved changes. Returns whether a
/// save happened.
pub async fn save_if_dirty(ledger: &LedgerState, storage: &StorageState) -> Result<bool, ApiError> {
    let _writing = storage.lock_writes().await;
    let Some(snapshot) = ledger.snapshot_if_dirty() else {
        debug!("No unsaved changes");
        return Ok(false);
    };

    match storage.save(&snapshot).await {
        Ok(_) => Ok(true),
        Err(e) => {
            warn!("Save failed, keeping changes marked unsaved");
            ledger.mark_dirty();
            Err(e)
        }
    }
}
