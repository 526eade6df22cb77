//! Error types for activerow

use thiserror::Error;

/// Result type alias for activerow operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for schema, validation and execution failures
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error reported by the executor
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error reported by the executor
    #[error("Execution error (code {code}): {message}")]
    Execution { code: u32, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A described column has no entry in the candidate row data
    #[error("column '{column}' of table '{table}' is missing from the row data")]
    MissingColumn { table: String, column: String },

    /// A non-nullable, non-generated column was given no value
    #[error("no value given for column '{column}' of table '{table}'")]
    MissingValue { table: String, column: String },

    /// The value's runtime type disagrees with the column's type class
    #[error("value for column '{column}' of table '{table}' must be {expected}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: &'static str,
    },

    /// A text value is longer than the declared column length
    #[error("value for column '{column}' of table '{table}' exceeds the maximum length ({max})")]
    LengthExceeded {
        table: String,
        column: String,
        max: u32,
    },

    /// A date or datetime value failed the pattern or calendar check
    #[error("value for column '{column}' of table '{table}' must use the format '{pattern}'")]
    InvalidDateFormat {
        table: String,
        column: String,
        pattern: &'static str,
    },

    /// A time value failed the component or range check
    #[error("value for column '{column}' of table '{table}' must use the format '{pattern}'")]
    InvalidTimeFormat {
        table: String,
        column: String,
        pattern: &'static str,
    },

    /// A row operation needs a primary-key value the row does not carry
    #[error("primary key '{column}' of table '{table}' has no value")]
    MissingPrimaryKey { table: String, column: String },

    /// Validation error outside the per-field checks
    #[error("Validation error: {0}")]
    Validation(String),
}

impl OrmError {
    /// Create an execution error carrying the driver's error code
    pub fn execution(code: u32, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error came out of per-field validation
    pub fn is_field_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. }
                | Self::MissingValue { .. }
                | Self::TypeMismatch { .. }
                | Self::LengthExceeded { .. }
                | Self::InvalidDateFormat { .. }
                | Self::InvalidTimeFormat { .. }
        )
    }
}
