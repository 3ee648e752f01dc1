//! # Seed Data Writer
//!
//! Writes the three demo sales into a database, replacing any saved state.
//!
//! ## Usage
//! ```bash
//! # Same database the app opens: RESERVA_DB_PATH, else the platform data dir
//! cargo run -p reserva-db --bin seed
//!
//! # Specify database path
//! cargo run -p reserva-db --bin seed -- --db ./data/reserva.db
//! ```
//!
//! ## Written Sales
//! - RES001 Juan Pérez, $1.500.000, Ana García
//! - RES002 María López, $2.200.000, Carlos Ruiz
//! - RES003 Pedro González, $1.800.000, Ana García
//!
//! The next created sale receives id 4.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use reserva_core::format::format_currency;
use reserva_core::Ledger;
use reserva_db::{default_database_path, Database, DbConfig, StateStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var_os("RESERVA_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(default_database_path);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Reserva TRIP Seed Data Writer");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path");
                println!(
                    "                     (default: $RESERVA_DB_PATH, else {})",
                    default_database_path().display()
                );
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Reserva TRIP Seed Data Writer");
    println!("================================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = StateStore::new(Arc::new(db.kv()));

    let ledger = Ledger::with_demo_data(Utc::now().date_naive());
    let state = store.save(&ledger).await?;

    for sale in &state.sales {
        println!(
            "  {:>3}  {:<8} {:<16} {:>12}  {}",
            sale.id,
            sale.reservation_code,
            sale.client,
            format_currency(sale.total_amount, "$"),
            sale.registering_agent
        );
    }

    println!();
    println!("✅ Wrote {} sales (next id {})", state.sales.len(), ledger.next_id());

    db.close().await;
    Ok(())
}
