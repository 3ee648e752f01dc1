//! # Commands
//!
//! Every user action, as a plain function over the state it needs.
//! The clap dispatcher and the interactive session both call these.
//!
//! - [`sale`] - Sale CRUD and search
//! - [`dashboard`] - Metrics and the report export
//! - [`data`] - Save, export and import

pub mod dashboard;
pub mod data;
pub mod sale;

use std::path::Path;

use serde::Serialize;

use crate::error::ApiError;

/// Writes `value` as pretty-printed JSON, creating parent directories.
pub(crate) fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
