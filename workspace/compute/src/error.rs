use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Caller supplied a missing or malformed argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store call exceeded the configured deadline
    #[error("Store call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A row read from the store does not fit the typed record
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The holiday source could not be queried or parsed
    #[error("Holiday lookup error: {0}")]
    HolidayLookup(String),

    /// Write rejected because of a uniqueness or reference conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Spreadsheet export could not be written
    #[error("Export error: {0}")]
    Export(String),
}

impl ComputeError {
    pub fn validation(message: impl Into<String>) -> Self {
        ComputeError::Validation(message.into())
    }

    /// True when the error is a unique-constraint violation reported by the store.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ComputeError::Database(err) => is_unique_violation(err),
            _ => false,
        }
    }
}

/// True when the database error is a unique-constraint violation.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

/// True when the database error is a foreign-key violation.
pub fn is_foreign_key_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))
    )
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
