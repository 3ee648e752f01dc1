//! # reserva-core: Pure Business Logic for Reserva TRIP
//!
//! The sales ledger and its metrics, as plain data and pure functions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Reserva TRIP Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    reserva (CLI app)                            │   │
//! │  │    commands ──► interactive session ──► tables / notifications  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ reserva-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │ ledger  │ │validation│ │metrics │  │   │
//! │  │   │  Sale   │ │  Money  │ │  CRUD   │ │  rules   │ │ totals │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TERMINAL • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                reserva-db (Persistence Layer)                   │   │
//! │  │        SQLite key/value store, persisted-state document         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (SaleRecord, SaleInput, CommissionRate)
//! - [`money`] - Money type with integer cents
//! - [`error`] - Domain error types
//! - [`validation`] - Sale form rules
//! - [`format`] - Currency, date and name formatting
//! - [`ledger`] - The record collection and its mutations
//! - [`metrics`] - Totals, rankings and monthly rollups
//!
//! ## Example Usage
//!
//! ```rust
//! use reserva_core::{Ledger, SaleInput, Money};
//!
//! let mut ledger = Ledger::new();
//! let sale = ledger
//!     .create(&SaleInput {
//!         sale_date: "2024-06-01".into(),
//!         reservation_code: "RES010".into(),
//!         client: "ana lopez".into(),
//!         total_amount: "1000000".into(),
//!         registering_agent: "juan diaz".into(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(sale.client, "Ana Lopez");
//! assert_eq!(sale.commission, Money::from_cents(30_000_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod format;
pub mod ledger;
pub mod metrics;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use ledger::Ledger;
pub use metrics::{AgentStats, MonthlyStats, SummaryReport, Totals};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Application version written into persisted state and shown in system info.
pub const APP_VERSION: &str = "1.0.0";
