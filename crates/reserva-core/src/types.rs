//! # Domain Types
//!
//! Core domain types used throughout Reserva TRIP.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────┐   ┌────────────────┐   │
//! │  │     SaleRecord       │   │    SaleInput    │   │ CommissionRate │   │
//! │  │  ──────────────────  │   │  ─────────────  │   │  ────────────  │   │
//! │  │  id (u64)            │   │  raw form text  │   │  bps (u32)     │   │
//! │  │  reservation_code    │   │  validated into │   │  3000 = 30%    │   │
//! │  │  total_amount        │   │  a SaleDraft    │   └────────────────┘   │
//! │  │  commission          │   └─────────────────┘                        │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every sale has:
//! - `id`: sequential integer assigned by the ledger, never reused
//! - `reservation_code`: business identifier from the booking system, unique

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 3000 bps = 30%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// The agency's fixed commission: 30% of the sale total.
    pub const STANDARD: CommissionRate = CommissionRate(3000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::STANDARD
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One recorded sale.
///
/// Field names serialize in camelCase so persisted state and export files
/// keep the shape `{ "id", "saleDate", "reservationCode", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecord {
    /// Sequential identifier assigned by the ledger.
    #[ts(type = "number")]
    pub id: u64,

    /// Business date of the sale.
    #[ts(as = "String")]
    pub sale_date: NaiveDate,

    /// Date the record was entered. Set once at creation.
    #[ts(as = "String")]
    pub registered_date: NaiveDate,

    /// Booking reference, unique across the ledger.
    pub reservation_code: String,

    /// Client name in title case.
    pub client: String,

    /// Sale total, strictly positive.
    #[ts(type = "number")]
    pub total_amount: Money,

    /// 30% of `total_amount`, rounded to the cent.
    #[ts(type = "number")]
    pub commission: Money,

    /// Agent who registered the sale, in title case.
    pub registering_agent: String,
}

// =============================================================================
// Sale Input
// =============================================================================

/// Raw form values for creating or editing a sale.
///
/// Everything is text, exactly as typed. [`crate::validation::validate_sale_input`]
/// turns it into a [`SaleDraft`] or reports every field problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SaleInput {
    pub sale_date: String,
    pub reservation_code: String,
    pub client: String,
    pub total_amount: String,
    pub registering_agent: String,
}

impl SaleInput {
    /// Pre-fills a form from an existing record (the edit dialog).
    pub fn from_record(record: &SaleRecord) -> Self {
        SaleInput {
            sale_date: record.sale_date.format("%Y-%m-%d").to_string(),
            reservation_code: record.reservation_code.clone(),
            client: record.client.clone(),
            total_amount: format_plain_amount(record.total_amount),
            registering_agent: record.registering_agent.clone(),
        }
    }
}

fn format_plain_amount(amount: Money) -> String {
    if amount.cents_part() == 0 {
        amount.units().to_string()
    } else {
        format!("{}.{:02}", amount.units(), amount.cents_part())
    }
}

/// A validated and normalized sale, ready for the ledger to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub sale_date: NaiveDate,
    pub reservation_code: String,
    pub client: String,
    pub total_amount: Money,
    pub registering_agent: String,
}

// =============================================================================
// Sale Field
// =============================================================================

/// The form fields a validation message can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaleField {
    SaleDate,
    ReservationCode,
    Client,
    TotalAmount,
    RegisteringAgent,
}

impl SaleField {
    /// All fields in form order.
    pub const ALL: [SaleField; 5] = [
        SaleField::SaleDate,
        SaleField::ReservationCode,
        SaleField::Client,
        SaleField::TotalAmount,
        SaleField::RegisteringAgent,
    ];

    /// Machine key, matching the record's JSON field name.
    pub fn key(&self) -> &'static str {
        match self {
            SaleField::SaleDate => "saleDate",
            SaleField::ReservationCode => "reservationCode",
            SaleField::Client => "client",
            SaleField::TotalAmount => "totalAmount",
            SaleField::RegisteringAgent => "registeringAgent",
        }
    }

    /// Human label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            SaleField::SaleDate => "Sale date",
            SaleField::ReservationCode => "Reservation code",
            SaleField::Client => "Client",
            SaleField::TotalAmount => "Sale total",
            SaleField::RegisteringAgent => "Registering agent",
        }
    }
}

impl fmt::Display for SaleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SaleRecord {
        SaleRecord {
            id: 7,
            sale_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            registered_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            reservation_code: "RES007".to_string(),
            client: "Juan Pérez".to_string(),
            total_amount: Money::from_cents(150_000_050),
            commission: Money::from_cents(45_000_015),
            registering_agent: "Ana García".to_string(),
        }
    }

    #[test]
    fn test_commission_rate() {
        assert_eq!(CommissionRate::default().bps(), 3000);
        assert!((CommissionRate::STANDARD.percentage() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sale_record_json_shape() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["saleDate"], "2024-06-01");
        assert_eq!(json["registeredDate"], "2024-06-02");
        assert_eq!(json["reservationCode"], "RES007");
        assert_eq!(json["totalAmount"], 1500000.5);
        assert_eq!(json["commission"], 450000.15);
        assert_eq!(json["registeringAgent"], "Ana García");
    }

    #[test]
    fn test_input_from_record() {
        let input = SaleInput::from_record(&record());
        assert_eq!(input.sale_date, "2024-06-01");
        assert_eq!(input.total_amount, "1500000.50");
        assert_eq!(input.client, "Juan Pérez");
    }

    #[test]
    fn test_field_key_and_label() {
        assert_eq!(SaleField::ReservationCode.key(), "reservationCode");
        assert_eq!(SaleField::TotalAmount.to_string(), "Sale total");
        assert_eq!(
            serde_json::to_string(&SaleField::RegisteringAgent).unwrap(),
            "\"registeringAgent\""
        );
    }
}
