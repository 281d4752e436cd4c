//! Store errors
//!
//! Classification of storage failures into the kinds callers can act on.

/// SQLSTATE class for integrity constraint violations
const CONSTRAINT_CLASS: &str = "23";
/// SQLSTATE for serialization failure
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for deadlock detected
const DEADLOCK_DETECTED: &str = "40P01";

/// Errors returned by the ledger store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced row does not exist
    #[error("record not found")]
    NotFound,

    /// A store-level integrity rule rejected a write
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The store aborted the unit of work due to concurrent contention.
    /// Retrying is a caller decision; the store never retries itself.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// A unit of work failed and the rollback failed too. Both errors are
    /// kept so neither is silently lost.
    #[error("transaction error: {source}; rollback error: {rollback}")]
    RollbackFailed {
        source: Box<StoreError>,
        rollback: sqlx::Error,
    },

    /// Any other storage failure, surfaced unchanged
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from_sqlx(err)
    }
}

impl StoreError {
    /// Whether an independent retry of the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    /// Classify a raw sqlx error by SQLSTATE
    fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => {
                if let Some(code) = db.code() {
                    if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED {
                        return StoreError::Conflict(db.message().to_string());
                    }
                    if code.starts_with(CONSTRAINT_CLASS) {
                        return StoreError::Constraint(db.message().to_string());
                    }
                }
                StoreError::Database(sqlx::Error::Database(db))
            }
            other => StoreError::Database(other),
        }
    }
}
