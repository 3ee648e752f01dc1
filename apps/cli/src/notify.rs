//! # Notifications
//!
//! Short, non-blocking status messages ("Sale registered", "Data saved").
//!
//! The shell holds an `Option<Arc<dyn Notifier>>`; with `None` messages are
//! only logged.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, warn};

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn icon(&self) -> &'static str {
        match self {
            Level::Success => "✅",
            Level::Info => "ℹ️ ",
            Level::Warning => "⚠️ ",
            Level::Error => "❌",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

/// Something that can show a status message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);
}

/// Prints messages to stderr so stdout stays clean for tables and JSON.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: Level, message: &str) {
        eprintln!("{} {}", level.icon(), message);
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: Level, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

/// Logs the message, then hands it to the notifier if there is one.
pub fn send(notifier: Option<&Arc<dyn Notifier>>, level: Level, message: &str) {
    match level {
        Level::Error => error!(%message, "Notification"),
        Level::Warning => warn!(%message, "Notification"),
        Level::Success | Level::Info => info!(%message, "Notification"),
    }

    if let Some(notifier) = notifier {
        notifier.notify(level, message);
    }
}
