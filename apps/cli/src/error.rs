//! # API Error Type
//!
//! Unified error type returned by every command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Reserva TRIP                           │
//! │                                                                         │
//! │  Command Function → Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── CoreError::Validation ──────► VALIDATION_ERROR + fields    │
//! │         ├── CoreError::DuplicateReservationCode ► DUPLICATE_KEY        │
//! │         ├── CoreError::SaleNotFound ────► NOT_FOUND                    │
//! │         ├── CoreError::InvalidFormat ───► FORMAT_ERROR                 │
//! │         └── DbError / io::Error ────────► PERSISTENCE_ERROR (logged)   │
//! │                                                                         │
//! │  One-shot commands: message on stderr, exit code per ErrorCode         │
//! │  Interactive session: field messages under the form, or a notification │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use reserva_core::{CoreError, SaleField};
use reserva_db::DbError;

use crate::state::ConfigError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Validation failed: Client is required",
///   "fields": [{ "field": "client", "message": "Client is required" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Per-field messages, for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: SaleField,
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No sale with the requested id
    NotFound,

    /// Form input failed validation
    ValidationError,

    /// Reservation code already in use
    DuplicateKey,

    /// Import data is not a valid list of sales
    FormatError,

    /// Storage read or write failed
    PersistenceError,

    /// Configuration file or value is invalid
    ConfigError,

    /// Prompt interrupted or terminal unavailable
    Interrupted,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit code for one-shot commands.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::NotFound => 3,
            ErrorCode::ValidationError | ErrorCode::DuplicateKey => 4,
            ErrorCode::FormatError => 5,
            ErrorCode::PersistenceError => 6,
            ErrorCode::ConfigError => 7,
            ErrorCode::Interrupted => 130,
            ErrorCode::Internal => 1,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a storage error.
    pub fn persistence(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PersistenceError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The message for one field, if this error carries one.
    pub fn field_message(&self, field: SaleField) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    /// Whether the user can fix this by editing the form.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ValidationError | ErrorCode::DuplicateKey
        )
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => {
                let fields = errors
                    .iter()
                    .map(|e| FieldError {
                        field: e.field(),
                        message: e.to_string(),
                    })
                    .collect();
                ApiError {
                    code: ErrorCode::ValidationError,
                    message: format!("Validation failed: {}", errors),
                    fields,
                }
            }
            CoreError::DuplicateReservationCode { code } => {
                let message = format!("Reservation code '{}' already exists", code);
                ApiError {
                    code: ErrorCode::DuplicateKey,
                    fields: vec![FieldError {
                        field: SaleField::ReservationCode,
                        message: message.clone(),
                    }],
                    message,
                }
            }
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", id),
            CoreError::InvalidFormat(reason) => {
                tracing::warn!(%reason, "Rejected sales data");
                ApiError::new(
                    ErrorCode::FormatError,
                    format!("Invalid sales data: {}", reason),
                )
            }
        }
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::CorruptState { key, reason } => {
                tracing::error!(%key, %reason, "Saved state is unreadable");
                ApiError::persistence(format!("Saved data under '{}' could not be read", key))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::persistence("Could not open local storage")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::persistence("Local storage schema could not be updated")
            }
            other => {
                tracing::error!("Storage error: {}", other);
                ApiError::persistence("Local storage operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", err);
        ApiError::persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("JSON encoding failed: {}", err))
    }
}

impl From<inquire::InquireError> for ApiError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => {
                ApiError::new(ErrorCode::Interrupted, "Cancelled")
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use reserva_core::{Ledger, SaleInput};

    #[test]
    fn test_validation_error_carries_fields() {
        let mut ledger = Ledger::new();
        let err: ApiError = ledger.create(&SaleInput::default()).unwrap_err().into();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields.len(), 5);
        assert_eq!(err.field_message(SaleField::Client), Some("Client is required"));
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_duplicate_maps_to_code_field() {
        let err = ApiError::from(CoreError::DuplicateReservationCode {
            code: "RES001".into(),
        });
        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(err.field_message(SaleField::ReservationCode).is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CoreError::SaleNotFound(9));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Sale not found: 9");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_storage_errors_are_persistence() {
        let err = ApiError::from(DbError::corrupt("reserva-trip-data", "bad"));
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert_eq!(err.code.exit_code(), 6);
        assert!(!err.is_user_correctable());

        let err = ApiError::from(DbError::ConnectionFailed("permission denied".into()));
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert_eq!(err.message, "Could not open local storage");
    }
}
