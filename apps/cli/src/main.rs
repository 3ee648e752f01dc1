//! # Reserva TRIP Entry Point
//!
//! The setup lives in `lib.rs` so it can be tested.

use std::process::ExitCode;

fn main() -> ExitCode {
    reserva_cli::run()
}
