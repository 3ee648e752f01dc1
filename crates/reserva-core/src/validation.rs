//! # Validation Module
//!
//! Field-level validation for the sale form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Rule predicates (this module)                                │
//! │  ├── required, positive number, length bounds, date format             │
//! │  └── each failure is scoped to one SaleField                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: validate_sale_input (this module)                            │
//! │  ├── runs EVERY rule, collects ALL failures                            │
//! │  └── normalizes names to title case                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger                                                       │
//! │  └── reservation code uniqueness                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use reserva_core::types::{SaleField, SaleInput};
//! use reserva_core::validation::validate_sale_input;
//!
//! let input = SaleInput {
//!     sale_date: "2024-06-01".into(),
//!     reservation_code: "".into(),
//!     client: "ana lopez".into(),
//!     total_amount: "-5".into(),
//!     registering_agent: "juan diaz".into(),
//! };
//! let errors = validate_sale_input(&input).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert!(errors.for_field(SaleField::ReservationCode).is_some());
//! assert!(errors.for_field(SaleField::TotalAmount).is_some());
//! ```

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationErrors};
use crate::format::{parse_date, title_case, trim};
use crate::money::Money;
use crate::types::{SaleDraft, SaleField, SaleInput};

/// Result type for single-rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted client or agent name. Imported records obey the same
/// bound, so anything the ledger holds can be edited through the form.
pub const MAX_NAME_LEN: usize = 100;

/// Amounts are entered in major units with at most this many decimals.
pub const MAX_AMOUNT_DECIMALS: usize = 2;

// =============================================================================
// Rule Predicates
// =============================================================================

/// Value must be present and non-blank after trimming.
pub fn validate_required(value: &str, field: SaleField) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Value must parse as a number strictly greater than zero, with no more
/// than two decimals.
///
/// ## Example
/// ```rust
/// use reserva_core::types::SaleField;
/// use reserva_core::validation::validate_positive_number;
///
/// assert!(validate_positive_number("1500000", SaleField::TotalAmount).is_ok());
/// assert!(validate_positive_number("0", SaleField::TotalAmount).is_err());
/// assert!(validate_positive_number("abc", SaleField::TotalAmount).is_err());
/// assert!(validate_positive_number("0.004", SaleField::TotalAmount).is_err());
/// ```
pub fn validate_positive_number(value: &str, field: SaleField) -> ValidationResult<Money> {
    let decimals = value
        .trim()
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len());
    if decimals > MAX_AMOUNT_DECIMALS && value.trim().parse::<f64>().is_ok() {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: format!("use at most {MAX_AMOUNT_DECIMALS} decimals"),
        });
    }

    match Money::parse(value) {
        Some(amount) if amount.is_positive() => Ok(amount),
        _ => Err(ValidationError::MustBePositive { field }),
    }
}

/// Value must have at least `min` characters. Empty values pass; pair with
/// [`validate_required`] when the field is mandatory.
pub fn validate_min_length(value: &str, min: usize, field: SaleField) -> ValidationResult<()> {
    let len = value.chars().count();
    if len > 0 && len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

/// Value must have at most `max` characters.
pub fn validate_max_length(value: &str, max: usize, field: SaleField) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Value must be an ISO date (`YYYY-MM-DD`).
pub fn validate_date(value: &str, field: SaleField) -> ValidationResult<NaiveDate> {
    parse_date(value).ok_or_else(|| ValidationError::InvalidFormat {
        field,
        reason: "expected a date as YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Form Validation
// =============================================================================

/// Validates a text field against the required rule and an optional upper
/// bound, recording at most one error so the form shows a single message per
/// field.
fn check_text(errors: &mut ValidationErrors, value: &str, field: SaleField, max: Option<usize>) {
    let rule = validate_required(value, field).and_then(|_| match max {
        Some(max) => validate_max_length(value, max, field),
        None => Ok(()),
    });

    errors.check(rule);
}

/// Validates a whole sale form and normalizes it.
///
/// ## Rules
/// - `sale_date`: required, ISO date
/// - `reservation_code`: required (trimmed)
/// - `client`, `registering_agent`: required, at most 100 characters, title-cased
/// - `total_amount`: a number greater than zero, at most two decimals
///
/// Every failing field is reported; nothing short-circuits.
pub fn validate_sale_input(input: &SaleInput) -> Result<SaleDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let sale_date = match validate_required(&input.sale_date, SaleField::SaleDate)
        .and_then(|_| validate_date(&input.sale_date, SaleField::SaleDate))
    {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let reservation_code = trim(&input.reservation_code);
    check_text(&mut errors, &reservation_code, SaleField::ReservationCode, None);

    let client = input.client.trim();
    check_text(&mut errors, client, SaleField::Client, Some(MAX_NAME_LEN));

    let total_amount = match validate_positive_number(&input.total_amount, SaleField::TotalAmount)
    {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let agent = input.registering_agent.trim();
    check_text(&mut errors, agent, SaleField::RegisteringAgent, Some(MAX_NAME_LEN));

    match (sale_date, total_amount) {
        (Some(sale_date), Some(total_amount)) if errors.is_empty() => Ok(SaleDraft {
            sale_date,
            reservation_code,
            client: title_case(client),
            total_amount,
            registering_agent: title_case(agent),
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> SaleInput {
        SaleInput {
            sale_date: "2024-06-01".to_string(),
            reservation_code: " RES010 ".to_string(),
            client: "ana lopez".to_string(),
            total_amount: "1000000".to_string(),
            registering_agent: "juan diaz".to_string(),
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("x", SaleField::Client).is_ok());
        assert!(validate_required("", SaleField::Client).is_err());
        assert!(validate_required("   ", SaleField::Client).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert_eq!(
            validate_positive_number("99.99", SaleField::TotalAmount).unwrap(),
            Money::from_cents(9999)
        );
        assert!(validate_positive_number("0", SaleField::TotalAmount).is_err());
        assert!(validate_positive_number("-1", SaleField::TotalAmount).is_err());
        assert!(validate_positive_number("", SaleField::TotalAmount).is_err());
    }

    #[test]
    fn test_sub_cent_amounts_report_decimals() {
        for value in ["0.004", "0.001", "12.345"] {
            let err = validate_positive_number(value, SaleField::TotalAmount).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Sale total has invalid format: use at most 2 decimals",
                "{value}"
            );
        }
        assert!(matches!(
            validate_positive_number("abc.def", SaleField::TotalAmount),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert_eq!(
            validate_positive_number(" 12.30 ", SaleField::TotalAmount).unwrap(),
            Money::from_cents(1230)
        );
    }

    #[test]
    fn test_length_bounds() {
        assert!(validate_min_length("A", 2, SaleField::Client).is_err());
        assert!(validate_min_length("", 2, SaleField::Client).is_ok());
        assert!(validate_min_length("Añ", 2, SaleField::Client).is_ok());
        assert!(validate_max_length(&"x".repeat(31), 30, SaleField::ReservationCode).is_err());
        assert!(validate_max_length(&"x".repeat(30), 30, SaleField::ReservationCode).is_ok());
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let draft = validate_sale_input(&valid_input()).unwrap();
        assert_eq!(draft.reservation_code, "RES010");
        assert_eq!(draft.client, "Ana Lopez");
        assert_eq!(draft.registering_agent, "Juan Diaz");
        assert_eq!(draft.total_amount, Money::from_cents(100_000_000));
        assert_eq!(draft.sale_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_all_field_errors_are_reported() {
        let errors = validate_sale_input(&SaleInput::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
        for field in SaleField::ALL {
            assert!(errors.for_field(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn test_bad_date_and_long_name() {
        let input = SaleInput {
            sale_date: "2024-02-30".to_string(),
            client: "a".repeat(MAX_NAME_LEN + 1),
            ..valid_input()
        };
        let errors = validate_sale_input(&input).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors.for_field(SaleField::SaleDate),
            Some(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            errors.for_field(SaleField::Client),
            Some(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn test_short_names_and_long_codes_are_accepted() {
        let input = SaleInput {
            reservation_code: "R".repeat(40),
            client: "a".to_string(),
            registering_agent: "j".to_string(),
            ..valid_input()
        };
        let draft = validate_sale_input(&input).unwrap();
        assert_eq!(draft.client, "A");
        assert_eq!(draft.reservation_code.len(), 40);
    }
}
