//! # Auto-Save Task
//!
//! Periodically persists the ledger while the interactive session runs.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Auto-Save Loop                                   │
//! │                                                                         │
//! │  every interval:                                                        │
//! │    LedgerState dirty? ──no──► skip                                      │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │    snapshot (flag cleared under the lock) ──► StorageState::save        │
//! │          │                                                              │
//! │          └── on failure: flag set again, warning notification           │
//! │                                                                         │
//! │  shutdown message ──► loop exits                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed save never touches the in-memory ledger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::commands::data::save_if_dirty;
use crate::error::ApiError;
use crate::notify::{self, Level, Notifier};
use crate::state::{LedgerState, StorageState};

/// Background saver. Build with [`AutoSaver::new`], then spawn [`AutoSaver::run`].
pub struct AutoSaver {
    ledger: LedgerState,
    storage: StorageState,
    notifier: Option<Arc<dyn Notifier>>,
    period: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping the auto-save task.
#[derive(Clone)]
pub struct AutoSaveHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl AutoSaveHandle {
    /// Asks the task to stop after its current save, if any.
    pub async fn shutdown(&self) -> Result<(), ApiError> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ApiError::internal("Auto-save task already stopped"))
    }
}

impl AutoSaver {
    /// Creates the saver and its handle.
    pub fn new(
        ledger: LedgerState,
        storage: StorageState,
        notifier: Option<Arc<dyn Notifier>>,
        period: Duration,
    ) -> (Self, AutoSaveHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let saver = AutoSaver {
            ledger,
            storage,
            notifier,
            period,
            shutdown_rx,
        };

        (saver, AutoSaveHandle { shutdown_tx })
    }

    /// Creates the saver and spawns it on the current runtime.
    pub fn spawn(
        ledger: LedgerState,
        storage: StorageState,
        notifier: Option<Arc<dyn Notifier>>,
        period: Duration,
    ) -> (AutoSaveHandle, JoinHandle<()>) {
        let (saver, handle) = Self::new(ledger, storage, notifier, period);
        (handle, tokio::spawn(saver.run()))
    }

    /// Runs until the handle asks for shutdown or is dropped.
    pub async fn run(mut self) {
        info!(period_secs = self.period.as_secs_f64(), "Auto-save starting");

        // First tick after one full period; the session has just loaded.
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Auto-save shutting down");
                    break;
                }
            }
        }

        info!("Auto-save stopped");
    }

    async fn tick(&self) {
        match save_if_dirty(&self.ledger, &self.storage).await {
            Ok(true) => debug!("Auto-saved"),
            Ok(false) => {}
            Err(e) => {
                warn!(code = ?e.code, "Auto-save failed");
                notify::send(
                    self.notifier.as_ref(),
                    Level::Warning,
                    &format!("Auto-save failed: {}", e),
                );
            }
        }
    }
}
