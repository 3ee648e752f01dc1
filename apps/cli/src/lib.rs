//! # Reserva CLI Library
//!
//! The terminal application for Reserva TRIP: command line, interactive
//! session, auto-save and presentation.
//!
//! ## Module Organization
//! ```text
//! reserva_cli/
//! ├── lib.rs          ◄─── You are here (logging, runtime, exit codes)
//! ├── cli.rs          ◄─── clap definitions and one-shot dispatch
//! ├── session.rs      ◄─── interactive prompt loop
//! ├── shell.rs        ◄─── Shell: load, sections, system info, shutdown
//! ├── autosave.rs     ◄─── periodic save task
//! ├── render.rs       ◄─── comfy-table output
//! ├── notify.rs       ◄─── Notifier trait and console notifier
//! ├── state/
//! │   ├── config.rs   ◄─── ConfigState (TOML + RESERVA_* env)
//! │   ├── ledger.rs   ◄─── LedgerState (Arc<Mutex<Ledger>> + dirty flag)
//! │   └── storage.rs  ◄─── StorageState (SQLite or memory)
//! ├── commands/
//! │   ├── sale.rs     ◄─── sale CRUD and search
//! │   ├── dashboard.rs◄─── metrics and report export
//! │   └── data.rs     ◄─── save, export, import
//! └── error.rs        ◄─── ApiError and exit codes
//! ```
//!
//! ## State Management
//! Like the command layer it feeds, state is split into focused types rather
//! than one `AppState`: each command takes only the state it needs.
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │   LedgerState    │ │   StorageState   │ │    ConfigState       │
//! │  • Ledger mutex  │ │  • StateStore    │ │  • storage key       │
//! │  • dirty flag    │ │  • SQLite pool   │ │  • auto-save period  │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//! ```

pub mod autosave;
pub mod cli;
pub mod commands;
pub mod error;
pub mod notify;
pub mod render;
pub mod session;
pub mod shell;
pub mod state;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;

/// Runs the application and returns the process exit code.
///
/// ## Startup Sequence
/// 1. Parse arguments (clap prints help/usage errors itself)
/// 2. Initialize tracing to stderr
/// 3. Build a multi-threaded Tokio runtime
/// 4. Load config, open storage, load stored sales
/// 5. Run the command, then save pending changes
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    info!(version = reserva_core::APP_VERSION, "Starting Reserva TRIP");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&ApiError::internal(format!("Could not start runtime: {}", e))),
    };

    match runtime.block_on(cli::execute(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(err: &ApiError) -> ExitCode {
    error!(code = ?err.code, error = %err, "Command failed");
    for line in render::error_lines(err) {
        eprintln!("error: {}", line);
    }
    ExitCode::from(err.code.exit_code())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=reserva=trace` - Show trace for reserva crates only
/// - Default: `info,reserva=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reserva=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
