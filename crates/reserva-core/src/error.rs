//! # Error Types
//!
//! Domain-specific error types for reserva-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  reserva-core errors (this file)                                       │
//! │  ├── CoreError         - Ledger operation failures                     │
//! │  ├── ValidationErrors  - Every field problem found in one form         │
//! │  └── ValidationError   - A single field-scoped failure                 │
//! │                                                                         │
//! │  reserva-db errors (separate crate)                                    │
//! │  └── DbError           - Storage failures (PersistenceError)           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError          - What the user sees                            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

use crate::types::SaleField;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger operation failures.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// One or more form fields failed validation.
    ///
    /// User-correctable: every failing field is listed so the form can show
    /// all problems at once.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Another sale already uses this reservation code.
    #[error("Reservation code '{code}' already exists")]
    DuplicateReservationCode { code: String },

    /// No sale with this id.
    #[error("Sale not found: {0}")]
    SaleNotFound(u64),

    /// An import payload is not a well-formed sequence of sale records.
    #[error("Invalid sales data: {0}")]
    InvalidFormat(String),
}

impl CoreError {
    /// Creates an InvalidFormat error from anything printable.
    pub fn format(reason: impl fmt::Display) -> Self {
        CoreError::InvalidFormat(reason.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-scoped validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: SaleField },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: SaleField, min: usize },

    /// Field value is too long.
    #[error("{field} cannot be longer than {max} characters")]
    TooLong { field: SaleField, max: usize },

    /// Value must parse as a number greater than zero.
    #[error("{field} must be a number greater than 0")]
    MustBePositive { field: SaleField },

    /// Invalid format (e.g., unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: SaleField, reason: String },
}

impl ValidationError {
    /// The field this error belongs to.
    pub fn field(&self) -> SaleField {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => *field,
        }
    }
}

// =============================================================================
// Validation Errors (aggregate)
// =============================================================================

/// Every validation failure found in one form submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the error of a rule result, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// The first error reported for a field.
    pub fn for_field(&self, field: SaleField) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DuplicateReservationCode {
            code: "RES001".to_string(),
        };
        assert_eq!(err.to_string(), "Reservation code 'RES001' already exists");
        assert_eq!(CoreError::SaleNotFound(9).to_string(), "Sale not found: 9");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: SaleField::Client,
        };
        assert_eq!(err.to_string(), "Client is required");

        let err = ValidationError::MustBePositive {
            field: SaleField::TotalAmount,
        };
        assert_eq!(err.to_string(), "Sale total must be a number greater than 0");
    }

    #[test]
    fn test_aggregate_keeps_every_error() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        errors.check(Err(ValidationError::Required {
            field: SaleField::Client,
        }));
        errors.check(Err(ValidationError::MustBePositive {
            field: SaleField::TotalAmount,
        }));

        assert_eq!(errors.len(), 2);
        assert!(errors.for_field(SaleField::Client).is_some());
        assert!(errors.for_field(SaleField::SaleDate).is_none());
        assert_eq!(
            errors.to_string(),
            "Client is required; Sale total must be a number greater than 0"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors = ValidationErrors::from(ValidationError::Required {
            field: SaleField::SaleDate,
        });
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
