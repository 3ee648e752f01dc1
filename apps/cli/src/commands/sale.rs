//! # Sale Commands
//!
//! Create, read, update, delete and search sales.

use tracing::{debug, info};

use reserva_core::{SaleInput, SaleRecord};

use crate::error::ApiError;
use crate::state::LedgerState;

/// All sales in insertion order, optionally narrowed by a search term.
pub fn list_sales(ledger: &LedgerState, search: Option<&str>) -> Vec<SaleRecord> {
    debug!(?search, "list_sales command");

    ledger.with_ledger(|l| match search {
        Some(term) => l.search(term).into_iter().cloned().collect(),
        None => l.snapshot(),
    })
}

/// One sale by id.
pub fn get_sale(ledger: &LedgerState, id: u64) -> Result<SaleRecord, ApiError> {
    debug!(id, "get_sale command");

    let sale = ledger.with_ledger(|l| l.get_by_id(id).cloned())?;
    Ok(sale)
}

/// Form values for editing an existing sale.
pub fn edit_form(ledger: &LedgerState, id: u64) -> Result<SaleInput, ApiError> {
    let sale = get_sale(ledger, id)?;
    Ok(SaleInput::from_record(&sale))
}

/// Registers a new sale.
pub fn create_sale(ledger: &LedgerState, input: &SaleInput) -> Result<SaleRecord, ApiError> {
    debug!(code = %input.reservation_code, "create_sale command");

    let sale = ledger.mutate(|l| l.create(input))?;

    info!(
        id = sale.id,
        code = %sale.reservation_code,
        total_cents = sale.total_amount.cents(),
        commission_cents = sale.commission.cents(),
        "Sale registered"
    );
    Ok(sale)
}

/// Replaces the editable fields of a sale.
pub fn update_sale(
    ledger: &LedgerState,
    id: u64,
    input: &SaleInput,
) -> Result<SaleRecord, ApiError> {
    debug!(id, code = %input.reservation_code, "update_sale command");

    let sale = ledger.mutate(|l| l.update(id, input))?;

    info!(
        id = sale.id,
        code = %sale.reservation_code,
        total_cents = sale.total_amount.cents(),
        "Sale updated"
    );
    Ok(sale)
}

/// Removes a sale.
pub fn delete_sale(ledger: &LedgerState, id: u64) -> Result<SaleRecord, ApiError> {
    debug!(id, "delete_sale command");

    let sale = ledger.mutate(|l| l.delete(id))?;

    info!(id = sale.id, code = %sale.reservation_code, "Sale deleted");
    Ok(sale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reserva_core::{Ledger, Money, SaleField};

    use crate::error::ErrorCode;

    fn state() -> LedgerState {
        LedgerState::new(Ledger::with_demo_data(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        ))
    }

    fn input(code: &str) -> SaleInput {
        SaleInput {
            sale_date: "2024-06-01".into(),
            reservation_code: code.into(),
            client: "ana lopez".into(),
            total_amount: "1000000".into(),
            registering_agent: "juan diaz".into(),
        }
    }

    #[test]
    fn test_create_then_get() {
        let ledger = state();
        let sale = create_sale(&ledger, &input("RES010")).unwrap();
        assert_eq!(sale.id, 4);
        assert_eq!(sale.commission, Money::from_cents(30_000_000));
        assert_eq!(get_sale(&ledger, 4).unwrap(), sale);
        assert!(ledger.is_dirty());
    }

    #[test]
    fn test_create_duplicate_is_field_error() {
        let ledger = state();
        let err = create_sale(&ledger, &input("RES001")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(err.field_message(SaleField::ReservationCode).is_some());
        assert!(!ledger.is_dirty());
    }

    #[test]
    fn test_edit_form_round_trips() {
        let ledger = state();
        let form = edit_form(&ledger, 2).unwrap();
        assert_eq!(form.reservation_code, "RES002");
        assert_eq!(form.total_amount, "2200000");

        let updated = update_sale(&ledger, 2, &form).unwrap();
        assert_eq!(updated, get_sale(&ledger, 2).unwrap());
    }

    #[test]
    fn test_delete_and_missing() {
        let ledger = state();
        delete_sale(&ledger, 1).unwrap();
        assert_eq!(delete_sale(&ledger, 1).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(get_sale(&ledger, 1).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(list_sales(&ledger, None).len(), 2);
    }

    #[test]
    fn test_list_with_search() {
        let ledger = state();
        assert_eq!(list_sales(&ledger, Some("garcía")).len(), 2);
        assert_eq!(list_sales(&ledger, Some("zzz")).len(), 0);
    }
}
