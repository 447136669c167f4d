//! Sample log error types

use thiserror::Error;

/// Errors that can occur in the sample log
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying database failed
    #[error("Database error: {0}")]
    Database(String),

    /// Row did not round-trip through the database schema
    #[error("Corrupt row: {0}")]
    Corruption(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result type alias for sample log operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Database("table missing".to_string());
        assert_eq!(err.to_string(), "Database error: table missing");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}
