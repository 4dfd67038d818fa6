// ==========================================
// Asset Ledger - repository error types
// ==========================================
// thiserror derive; rusqlite errors are classified so callers can
// pattern-match "constraint violation" (downgrade to a row error)
// against "infrastructure failure" (abort the batch).
// ==========================================

use thiserror::Error;

/// Repository layer errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== lookups =====
    #[error("record not found: {entity} with key '{key}'")]
    NotFound { entity: String, key: String },

    // ===== constraint violations (row-recoverable) =====
    #[error("unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    // ===== infrastructure (batch-fatal) =====
    #[error("database connection failed: {0}")]
    ConnectionError(String),

    #[error("database transaction failed: {0}")]
    TransactionError(String),

    #[error("database query failed: {0}")]
    QueryError(String),

    #[error("database lock acquisition failed: {0}")]
    LockError(String),

    // ===== wiring =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// True for errors a single bad row can cause. The upload engine
    /// downgrades these to a row-level rejection; anything else aborts
    /// the whole batch as indeterminate.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            RepositoryError::UniqueConstraintViolation(_)
                | RepositoryError::ForeignKeyViolation(_)
        )
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::DatabaseBusy) {
            return RepositoryError::LockError(err.to_string());
        }
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::QueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "unknown".to_string(),
                key: "unknown".to_string(),
            },
            _ => RepositoryError::QueryError(err.to_string()),
        }
    }
}

/// Result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
