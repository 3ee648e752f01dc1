//! # Application Shell
//!
//! Owns the state objects for one run of the program: it loads the persisted
//! ledger, runs the auto-save task, tracks the current section and makes the
//! final save on shutdown.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shell Lifecycle                                  │
//! │                                                                         │
//! │  Shell::new(config, storage, notifier)                                 │
//! │     └── ledger starts with the demo sales                              │
//! │                                                                         │
//! │  init()                                                                │
//! │     ├── load_data(): stored state replaces the ledger                  │
//! │     │     └── unreadable state: warning, demo ledger kept              │
//! │     └── section = config.default_section                               │
//! │                                                                         │
//! │  start_auto_save()          (interactive session only)                 │
//! │                                                                         │
//! │  shutdown()                                                            │
//! │     ├── stop auto-save                                                 │
//! │     ├── save if there are unsaved changes                              │
//! │     └── close storage                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use reserva_core::Ledger;

use crate::autosave::{AutoSaveHandle, AutoSaver};
use crate::commands::data;
use crate::error::ApiError;
use crate::notify::{self, Level, Notifier};
use crate::state::{ConfigState, LedgerState, StorageState};

/// Screen the interactive session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dashboard,
    Ventas,
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Ventas => "ventas",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(Section::Dashboard),
            "ventas" | "sales" => Ok(Section::Ventas),
            other => Err(format!("Unknown section: {}", other)),
        }
    }
}

/// What [`Shell::load_data`] found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored sales replaced the ledger.
    Restored(usize),
    /// Nothing stored yet.
    Empty,
    /// Stored state could not be read; the ledger was left as it was.
    Failed,
}

/// Snapshot of the shell's status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub app_name: String,
    pub version: String,
    pub section: Section,
    pub initialized: bool,
    pub storage: String,
    pub sales: usize,
    pub unsaved_changes: bool,
    pub timestamp: DateTime<Utc>,
}

/// The running application.
pub struct Shell {
    config: ConfigState,
    ledger: LedgerState,
    storage: StorageState,
    notifier: Option<Arc<dyn Notifier>>,
    section: Section,
    initialized: bool,
    auto_save: Option<(AutoSaveHandle, JoinHandle<()>)>,
}

impl Shell {
    /// Builds a shell whose ledger holds the demo sales.
    pub fn new(
        config: ConfigState,
        storage: StorageState,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        let ledger = LedgerState::new(Ledger::with_demo_data(Utc::now().date_naive()));
        let section = config.default_section;

        Shell {
            config,
            ledger,
            storage,
            notifier,
            section,
            initialized: false,
            auto_save: None,
        }
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    pub fn storage(&self) -> &StorageState {
        &self.storage
    }

    pub fn notifier(&self) -> Option<&Arc<dyn Notifier>> {
        self.notifier.as_ref()
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sends a notification through the configured notifier.
    pub fn notify(&self, level: Level, message: &str) {
        notify::send(self.notifier.as_ref(), level, message);
    }

    /// Loads stored data and opens the default section.
    pub async fn init(&mut self) -> LoadOutcome {
        info!(
            app = %self.config.app_name,
            version = %self.config.version,
            storage = %self.storage.backend(),
            "Initializing"
        );

        let outcome = self.load_data().await;
        self.section = self.config.default_section;
        self.initialized = true;

        info!(?outcome, section = %self.section, "Initialized");
        outcome
    }

    /// Replaces the ledger with the stored one, if any.
    ///
    /// A read or parse failure is reported and leaves the ledger untouched.
    pub async fn load_data(&self) -> LoadOutcome {
        match self.storage.load().await {
            Ok(Some(ledger)) => {
                let count = ledger.len();
                self.ledger.replace(ledger);
                info!(sales = count, "Stored sales loaded");
                LoadOutcome::Restored(count)
            }
            Ok(None) => {
                debug!("No stored sales");
                LoadOutcome::Empty
            }
            Err(e) => {
                warn!(code = ?e.code, error = %e, "Could not load stored sales");
                self.notify(
                    Level::Warning,
                    &format!("Stored data could not be loaded: {}", e),
                );
                LoadOutcome::Failed
            }
        }
    }

    /// Saves now and reports the result.
    pub async fn save_data(&self) -> Result<(), ApiError> {
        match data::save_now(&self.ledger, &self.storage).await {
            Ok(state) => {
                info!(sales = state.sales.len(), "Data saved");
                self.notify(Level::Success, "Data saved");
                Ok(())
            }
            Err(e) => {
                self.notify(Level::Error, &format!("Save failed: {}", e));
                Err(e)
            }
        }
    }

    /// Switches section by name. Unknown names are logged and ignored.
    pub fn show_section(&mut self, name: &str) -> bool {
        match name.parse::<Section>() {
            Ok(section) => {
                debug!(%section, "Showing section");
                self.section = section;
                true
            }
            Err(_) => {
                warn!(section = %name, "Ignoring unknown section");
                false
            }
        }
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            app_name: self.config.app_name.clone(),
            version: self.config.version.clone(),
            section: self.section,
            initialized: self.initialized,
            storage: self.storage.backend().to_string(),
            sales: self.ledger.with_ledger(|l| l.len()),
            unsaved_changes: self.ledger.is_dirty(),
            timestamp: Utc::now(),
        }
    }

    /// Last-resort handler for failures nothing else dealt with.
    ///
    /// The ledger is not touched, so the session can carry on.
    pub fn handle_global_error(&self, err: &ApiError) {
        error!(code = ?err.code, error = %err, "Unhandled error");
        self.notify(
            Level::Error,
            "Something went wrong. Your data is still in memory; save to keep it.",
        );
    }

    /// Starts the auto-save task on the current runtime. Calling it twice
    /// keeps the first task.
    pub fn start_auto_save(&mut self) {
        if self.auto_save.is_some() {
            return;
        }
        let running = AutoSaver::spawn(
            self.ledger.clone(),
            self.storage.clone(),
            self.notifier.clone(),
            self.config.auto_save_interval(),
        );
        self.auto_save = Some(running);
    }

    pub fn auto_save_running(&self) -> bool {
        self.auto_save.is_some()
    }

    async fn stop_auto_save(&mut self) {
        if let Some((handle, task)) = self.auto_save.take() {
            if let Err(e) = handle.shutdown().await {
                debug!(error = %e, "Auto-save already stopped");
            }
            if let Err(e) = task.await {
                warn!(error = %e, "Auto-save task ended abnormally");
            }
        }
    }

    /// Stops auto-save, saves pending changes and closes storage.
    pub async fn shutdown(mut self) -> Result<(), ApiError> {
        info!("Shutting down");
        self.stop_auto_save().await;

        let result = data::save_if_dirty(&self.ledger, &self.storage).await;
        match &result {
            Ok(true) => info!("Pending changes saved"),
            Ok(false) => {}
            Err(e) => {
                self.notify(Level::Error, &format!("Unsaved changes were lost: {}", e));
            }
        }

        self.storage.close().await;
        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserva_core::SaleInput;
    use reserva_db::MemoryStore;

    use crate::notify::RecordingNotifier;

    fn input(code: &str) -> SaleInput {
        SaleInput {
            sale_date: "2024-07-01".into(),
            reservation_code: code.into(),
            client: "eva".into(),
            total_amount: "100".into(),
            registering_agent: "luis".into(),
        }
    }

    fn shell_with(store: Arc<MemoryStore>) -> (Shell, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        let notifier: Arc<dyn Notifier> = recorder.clone();
        let storage = StorageState::with_store(store, "reserva-trip-data");
        (
            Shell::new(ConfigState::default(), storage, Some(notifier)),
            recorder,
        )
    }

    #[test]
    fn test_section_parse() {
        assert_eq!("dashboard".parse::<Section>(), Ok(Section::Dashboard));
        assert_eq!("Ventas".parse::<Section>(), Ok(Section::Ventas));
        assert_eq!("sales".parse::<Section>(), Ok(Section::Ventas));
        assert!("reports".parse::<Section>().is_err());
        assert_eq!(Section::Ventas.to_string(), "ventas");
    }

    #[tokio::test]
    async fn test_init_fresh_store_keeps_demo() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()));
        assert!(!shell.is_initialized());

        assert_eq!(shell.init().await, LoadOutcome::Empty);
        assert!(shell.is_initialized());
        assert_eq!(shell.ledger().snapshot().len(), 3);
        assert_eq!(shell.section(), Section::Dashboard);
    }

    #[tokio::test]
    async fn test_init_restores_saved_ledger() {
        let store = Arc::new(MemoryStore::new());
        {
            let (shell, _) = shell_with(store.clone());
            shell.ledger().mutate(|l| l.create(&input("RES100"))).unwrap();
            shell.shutdown().await.unwrap();
        }

        let (mut shell, _) = shell_with(store);
        assert_eq!(shell.init().await, LoadOutcome::Restored(4));
        assert_eq!(shell.ledger().snapshot().next_id(), 5);
        assert!(!shell.ledger().is_dirty());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_reported_not_fatal() {
        use reserva_db::BlobStore;

        let store = Arc::new(MemoryStore::new());
        store.put("reserva-trip-data", "{not json").await.unwrap();

        let (mut shell, recorder) = shell_with(store);
        assert_eq!(shell.init().await, LoadOutcome::Failed);
        assert!(shell.is_initialized());
        assert_eq!(shell.ledger().snapshot().len(), 3);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Level::Warning);
    }

    #[tokio::test]
    async fn test_show_section() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()));
        assert!(shell.show_section("ventas"));
        assert_eq!(shell.section(), Section::Ventas);
        assert!(!shell.show_section("settings"));
        assert_eq!(shell.section(), Section::Ventas);
    }

    #[tokio::test]
    async fn test_system_info() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()));
        shell.init().await;
        let info = shell.system_info();
        assert_eq!(info.version, "1.0.0");
        assert!(info.initialized);
        assert_eq!(info.sales, 3);
        assert!(!info.unsaved_changes);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["section"], "dashboard");
        assert_eq!(json["unsavedChanges"], false);
    }

    #[tokio::test]
    async fn test_save_data_notifies() {
        let (shell, recorder) = shell_with(Arc::new(MemoryStore::new()));
        shell.save_data().await.unwrap();
        assert_eq!(
            recorder.messages(),
            vec![(Level::Success, "Data saved".to_string())]
        );
        assert_eq!(shell.storage().load().await.unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_global_error_keeps_ledger() {
        let (shell, recorder) = shell_with(Arc::new(MemoryStore::new()));
        shell.handle_global_error(&ApiError::internal("boom"));
        assert_eq!(shell.ledger().snapshot().len(), 3);
        assert_eq!(recorder.messages()[0].0, Level::Error);
    }

    #[tokio::test]
    async fn test_auto_save_starts_once_and_stops() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()));
        shell.start_auto_save();
        shell.start_auto_save();
        assert!(shell.auto_save_running());
        shell.shutdown().await.unwrap();
    }
}
