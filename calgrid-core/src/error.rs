//! Error types for calgrid.

use thiserror::Error;

/// Errors that can occur in calgrid operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalGridError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate key: '{0}' is already present")]
    DuplicateKey(String),

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("Invalid day key '{0}'. Expected YYYYMMDD")]
    InvalidDayKey(String),
}

/// Result type alias for calgrid operations.
pub type CalGridResult<T> = Result<T, CalGridError>;
