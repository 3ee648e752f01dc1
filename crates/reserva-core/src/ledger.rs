//! # Sales Ledger
//!
//! The authoritative in-memory collection of sale records and the single
//! point of mutation.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Operations                                │
//! │                                                                         │
//! │  create(input)                                                         │
//! │     ├── validate_sale_input  → Validation(all field errors)            │
//! │     ├── code already used?   → DuplicateReservationCode                │
//! │     ├── commission = 30% of total, rounded to the cent                 │
//! │     └── id = next_id; next_id += 1; append                             │
//! │                                                                         │
//! │  update(id, input)                                                     │
//! │     ├── id missing?          → SaleNotFound                            │
//! │     ├── same checks as create, the edited record excluded              │
//! │     └── keeps id and registered_date                                   │
//! │                                                                         │
//! │  delete(id)                  → SaleNotFound or the removed record      │
//! │                                                                         │
//! │  replace_all(records)                                                  │
//! │     ├── every record checked before anything changes                   │
//! │     └── next_id = max(id) + 1, or 1 when empty                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Reservation codes are unique (case-sensitive exact match).
//! - Ids are never reused: `next_id` only grows between imports.
//! - Records keep insertion order.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};

use crate::error::{CoreError, CoreResult};
use crate::format::{format_currency, format_date};
use crate::money::Money;
use crate::types::{CommissionRate, SaleDraft, SaleInput, SaleRecord};
use crate::validation::{validate_sale_input, MAX_NAME_LEN};

/// The in-memory sales ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<SaleRecord>,
    next_id: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::new()
    }
}

impl Ledger {
    /// Creates an empty ledger whose first id will be 1.
    pub fn new() -> Self {
        Ledger {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Creates a ledger from existing records, with the same checks as an import.
    pub fn from_records(records: Vec<SaleRecord>) -> CoreResult<Self> {
        let mut ledger = Ledger::new();
        ledger.replace_all(records)?;
        Ok(ledger)
    }

    /// A ledger pre-filled with the three demo sales a fresh install shows.
    pub fn with_demo_data(registered_date: NaiveDate) -> Self {
        let demo = [
            (1, (2024, 6, 1), "RES001", "Juan Pérez", 1_500_000, "Ana García"),
            (2, (2024, 6, 2), "RES002", "María López", 2_200_000, "Carlos Ruiz"),
            (3, (2024, 6, 3), "RES003", "Pedro González", 1_800_000, "Ana García"),
        ];

        let records = demo
            .into_iter()
            .filter_map(|(id, (y, m, d), code, client, total, agent)| {
                let sale_date = NaiveDate::from_ymd_opt(y, m, d)?;
                let total_amount = Money::from_cents(total * 100);
                Some(SaleRecord {
                    id,
                    sale_date,
                    registered_date,
                    reservation_code: code.to_string(),
                    client: client.to_string(),
                    total_amount,
                    commission: total_amount.commission(CommissionRate::STANDARD),
                    registering_agent: agent.to_string(),
                })
            })
            .collect::<Vec<_>>();

        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Ledger { records, next_id }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All records in insertion order.
    pub fn list(&self) -> &[SaleRecord] {
        &self.records
    }

    /// An owned copy of the records, for rendering or persistence.
    pub fn snapshot(&self) -> Vec<SaleRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next created record will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Looks up a record by id.
    pub fn get_by_id(&self, id: u64) -> CoreResult<&SaleRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(CoreError::SaleNotFound(id))
    }

    /// Whether `code` is used by any record other than `exclude_id`.
    pub fn code_in_use(&self, code: &str, exclude_id: Option<u64>) -> bool {
        self.records
            .iter()
            .any(|r| r.reservation_code == code && Some(r.id) != exclude_id)
    }

    /// Case-insensitive substring search over the cells a sales table shows:
    /// dates (ISO and display form), code, client, amounts and agent.
    pub fn search(&self, term: &str) -> Vec<&SaleRecord> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }

        self.records
            .iter()
            .filter(|r| {
                let cells = [
                    r.sale_date.to_string(),
                    format_date(r.sale_date),
                    r.registered_date.to_string(),
                    format_date(r.registered_date),
                    r.reservation_code.clone(),
                    r.client.clone(),
                    format_currency(r.total_amount, "$"),
                    format_currency(r.commission, "$"),
                    r.registering_agent.clone(),
                ];
                cells.iter().any(|c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a sale registered today (UTC calendar date).
    pub fn create(&mut self, input: &SaleInput) -> CoreResult<SaleRecord> {
        self.create_on(input, Utc::now().date_naive())
    }

    /// Creates a sale with an explicit registration date.
    pub fn create_on(
        &mut self,
        input: &SaleInput,
        registered_date: NaiveDate,
    ) -> CoreResult<SaleRecord> {
        let draft = self.checked_draft(input, None)?;

        let record = SaleRecord {
            id: self.next_id,
            sale_date: draft.sale_date,
            registered_date,
            commission: draft.total_amount.commission(CommissionRate::STANDARD),
            reservation_code: draft.reservation_code,
            client: draft.client,
            total_amount: draft.total_amount,
            registering_agent: draft.registering_agent,
        };

        self.next_id += 1;
        self.records.push(record.clone());
        Ok(record)
    }

    /// Replaces the editable fields of a sale, keeping its id and
    /// registration date and recomputing the commission.
    pub fn update(&mut self, id: u64, input: &SaleInput) -> CoreResult<SaleRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(CoreError::SaleNotFound(id))?;

        let draft = self.checked_draft(input, Some(id))?;

        let record = &mut self.records[index];
        record.sale_date = draft.sale_date;
        record.reservation_code = draft.reservation_code;
        record.client = draft.client;
        record.commission = draft.total_amount.commission(CommissionRate::STANDARD);
        record.total_amount = draft.total_amount;
        record.registering_agent = draft.registering_agent;

        Ok(record.clone())
    }

    /// Removes a sale and returns it.
    pub fn delete(&mut self, id: u64) -> CoreResult<SaleRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(CoreError::SaleNotFound(id))?;
        Ok(self.records.remove(index))
    }

    /// Replaces the whole collection (import / restore).
    ///
    /// Every record must have a non-zero unique id, a unique non-blank
    /// reservation code, client and agent names that the sale form would
    /// accept, a positive total and a non-negative commission. On any failure the ledger is left untouched.
    pub fn replace_all(&mut self, records: Vec<SaleRecord>) -> CoreResult<()> {
        check_records(&records)?;
        self.next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        self.records = records;
        Ok(())
    }

    /// Parses a JSON array of sale records and replaces the collection.
    ///
    /// Returns the number of imported records.
    pub fn import_json(&mut self, json: &str) -> CoreResult<usize> {
        let records: Vec<SaleRecord> = serde_json::from_str(json).map_err(CoreError::format)?;
        let count = records.len();
        self.replace_all(records)?;
        Ok(count)
    }

    /// Serializes the records as a pretty-printed JSON array.
    pub fn export_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(&self.records).map_err(CoreError::format)
    }

    fn checked_draft(&self, input: &SaleInput, exclude_id: Option<u64>) -> CoreResult<SaleDraft> {
        let draft = validate_sale_input(input)?;
        if self.code_in_use(&draft.reservation_code, exclude_id) {
            return Err(CoreError::DuplicateReservationCode {
                code: draft.reservation_code,
            });
        }
        Ok(draft)
    }
}

fn check_records(records: &[SaleRecord]) -> CoreResult<()> {
    let mut ids = HashSet::with_capacity(records.len());
    let mut codes = HashSet::with_capacity(records.len());

    for (index, r) in records.iter().enumerate() {
        let at = |what: &str| CoreError::format(format!("record #{}: {what}", index + 1));

        if r.id == 0 {
            return Err(at("id must be greater than 0"));
        }
        if !ids.insert(r.id) {
            return Err(at(&format!("duplicate id {}", r.id)));
        }
        if r.reservation_code.trim().is_empty() {
            return Err(at("reservation code is empty"));
        }
        if !codes.insert(r.reservation_code.as_str()) {
            return Err(at(&format!(
                "duplicate reservation code '{}'",
                r.reservation_code
            )));
        }
        if r.client.trim().is_empty() {
            return Err(at("client is empty"));
        }
        if r.registering_agent.trim().is_empty() {
            return Err(at("registering agent is empty"));
        }
        if r.client.chars().count() > MAX_NAME_LEN
            || r.registering_agent.chars().count() > MAX_NAME_LEN
        {
            return Err(at(&format!("names cannot be longer than {MAX_NAME_LEN} characters")));
        }
        if !r.total_amount.is_positive() {
            return Err(at("total amount must be greater than 0"));
        }
        if r.commission.cents() < 0 {
            return Err(at("commission cannot be negative"));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleField;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(code: &str, total: &str) -> SaleInput {
        SaleInput {
            sale_date: "2024-06-01".to_string(),
            reservation_code: code.to_string(),
            client: "ana lopez".to_string(),
            total_amount: total.to_string(),
            registering_agent: "juan diaz".to_string(),
        }
    }

    #[test]
    fn test_create_scenario() {
        let mut ledger = Ledger::with_demo_data(date(2024, 6, 10));
        let record = ledger
            .create_on(&input("RES010", "1000000"), date(2024, 6, 10))
            .unwrap();

        assert_eq!(record.id, 4);
        assert_eq!(record.client, "Ana Lopez");
        assert_eq!(record.registering_agent, "Juan Diaz");
        assert_eq!(record.commission, Money::from_cents(30_000_000));
        assert_eq!(record.registered_date, date(2024, 6, 10));
        assert_eq!(ledger.next_id(), 5);
        assert_eq!(ledger.list().last(), Some(&record));
    }

    #[test]
    fn test_commission_follows_total() {
        let mut ledger = Ledger::new();
        for total in ["0.05", "1", "333.33", "1500000.10", "99999999.99"] {
            let code = format!("C-{total}");
            let record = ledger.create(&input(&code, total)).unwrap();
            assert_eq!(
                record.commission,
                record.total_amount.commission(CommissionRate::STANDARD)
            );
        }

        let updated = ledger.update(1, &input("C-0.05", "10")).unwrap();
        assert_eq!(updated.commission, Money::from_cents(300));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut ledger = Ledger::new();
        ledger.create(&input("RES001", "100")).unwrap();

        let err = ledger.create(&input("RES001", "200")).unwrap_err();
        assert_eq!(
            err,
            CoreError::DuplicateReservationCode {
                code: "RES001".to_string()
            }
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_id(), 2);

        // Matching is exact and case-sensitive.
        assert!(ledger.create(&input("res001", "200")).is_ok());
    }

    #[test]
    fn test_update_keeps_own_code_and_identity() {
        let mut ledger = Ledger::new();
        let original = ledger.create_on(&input("RES001", "100"), date(2024, 1, 1)).unwrap();
        ledger.create(&input("RES002", "100")).unwrap();

        let updated = ledger.update(original.id, &input("RES001", "250")).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.registered_date, date(2024, 1, 1));
        assert_eq!(updated.total_amount, Money::from_cents(25_000));

        let err = ledger.update(original.id, &input("RES002", "250")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateReservationCode { .. }));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut ledger = Ledger::new();
        let err = ledger.update(42, &SaleInput::default()).unwrap_err();
        assert_eq!(err, CoreError::SaleNotFound(42));
    }

    #[test]
    fn test_validation_errors_surface_all_fields() {
        let mut ledger = Ledger::new();
        let bad = SaleInput {
            client: " ".to_string(),
            total_amount: "0".to_string(),
            ..input("RES001", "1")
        };
        match ledger.create(&bad).unwrap_err() {
            CoreError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.for_field(SaleField::Client).is_some());
                assert!(errors.for_field(SaleField::TotalAmount).is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_ids_never_reused() {
        let mut ledger = Ledger::new();
        let mut last = 0;
        for i in 0..10 {
            let record = ledger.create(&input(&format!("R{i}"), "10")).unwrap();
            assert!(record.id > last);
            last = record.id;
            if i % 3 == 0 {
                ledger.delete(record.id).unwrap();
            }
        }
        assert_eq!(ledger.next_id(), 11);
    }

    #[test]
    fn test_delete_missing_leaves_ledger_unchanged() {
        let mut ledger = Ledger::with_demo_data(date(2024, 6, 1));
        assert_eq!(ledger.delete(99).unwrap_err(), CoreError::SaleNotFound(99));
        assert_eq!(ledger.len(), 3);

        let removed = ledger.delete(2).unwrap();
        assert_eq!(removed.reservation_code, "RES002");
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get_by_id(2).is_err());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut ledger = Ledger::with_demo_data(date(2024, 6, 1));
        ledger.create(&input("RES010", "1234.56")).unwrap();
        ledger.delete(1).unwrap();
        let json = ledger.export_json().unwrap();

        let mut restored = Ledger::new();
        assert_eq!(restored.import_json(&json).unwrap(), 3);
        assert_eq!(restored.list(), ledger.list());
        assert_eq!(restored.next_id(), 5);
    }

    #[test]
    fn test_import_malformed_leaves_ledger_unchanged() {
        let mut ledger = Ledger::with_demo_data(date(2024, 6, 1));
        let before = ledger.clone();

        for bad in ["not json", "{\"sales\": []}", "[{\"id\": 1}]", "42"] {
            let err = ledger.import_json(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidFormat(_)), "{bad}: {err:?}");
        }
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_replace_all_rejects_duplicates() {
        let mut ledger = Ledger::new();
        let mut records = Ledger::with_demo_data(date(2024, 6, 1)).snapshot();
        records[1].reservation_code = "RES001".to_string();
        assert!(matches!(
            ledger.replace_all(records),
            Err(CoreError::InvalidFormat(_))
        ));

        let mut records = Ledger::with_demo_data(date(2024, 6, 1)).snapshot();
        records[2].id = 1;
        assert!(ledger.replace_all(records).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_imported_record_can_be_edited() {
        let mut ledger = Ledger::new();
        let mut records = Ledger::with_demo_data(date(2024, 6, 1)).snapshot();
        records[0].client = "X".to_string();
        records[0].reservation_code = "BOOKING-2024-06-0000000000000001".to_string();
        ledger.replace_all(records).unwrap();

        let imported = ledger.get_by_id(1).unwrap().clone();
        let edited = ledger.update(1, &SaleInput::from_record(&imported)).unwrap();
        assert_eq!(edited.client, "X");
        assert_eq!(edited.reservation_code, imported.reservation_code);
        assert_eq!(edited.total_amount, imported.total_amount);

        let mut records = ledger.snapshot();
        records[1].registering_agent = "a".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            ledger.replace_all(records),
            Err(CoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_replace_all_empty_resets_counter() {
        let mut ledger = Ledger::with_demo_data(date(2024, 6, 1));
        ledger.replace_all(Vec::new()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), 1);
    }

    #[test]
    fn test_search() {
        let ledger = Ledger::with_demo_data(date(2024, 6, 1));
        assert_eq!(ledger.search("ana garcía").len(), 2);
        assert_eq!(ledger.search("res002").len(), 1);
        assert_eq!(ledger.search("2.200.000").len(), 1);
        assert_eq!(ledger.search("3/6/2024").len(), 1);
        assert_eq!(ledger.search("").len(), 3);
        assert!(ledger.search("nobody").is_empty());
    }
}
