//! Storage error types.
//!
//! [`DbError`] separates two failure families:
//!
//! - `Core` wraps a [`CoreError`]: the storage layer refused the operation
//!   for a business reason (no stock, unknown product, bad period).
//! - Everything else is a storage fault. `Persistence` keeps the original
//!   driver error as its source so diagnostics survive the wrapping.

use caja_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// A domain rule refused the operation. See [`CoreError`].
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Entity lookup by id came back empty.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE constraint was violated (e.g. duplicate barcode).
    #[error("Duplicate {field}: value already exists")]
    UniqueViolation { field: String },

    /// A FOREIGN KEY constraint was violated.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Could not open or configure the database.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// No connection became available within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Any other storage fault, with the driver error preserved as source.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl DbError {
    /// Builds a `NotFound` for an entity/id pair.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound { entity: entity.into(), id: id.to_string() }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("record", "unknown"),
            sqlx::Error::Database(ref db_err) => {
                let message = db_err.message().to_string();
                if message.contains("UNIQUE constraint failed") {
                    // SQLite reports "UNIQUE constraint failed: table.column"
                    let field = message
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if message.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation { message }
                } else {
                    DbError::Persistence(err)
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            other => DbError::Persistence(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Convenience alias for storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Sale", 42);
        assert_eq!(err.to_string(), "Sale not found: 42");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_core_error_passes_through_transparently() {
        let core = CoreError::ProductNotFound { id: 7 };
        let err: DbError = core.into();
        // transparent wrapping keeps the domain message untouched
        assert_eq!(err.to_string(), "Product not found: 7");
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound { id: 7 })));
    }
}
