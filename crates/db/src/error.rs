use thiserror::Error;

/// Errors returned by repository implementations.
///
/// Absence on lookups is not an error: repositories return `Ok(None)` for
/// that. `NotFound` is reserved for writes that target a missing row.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness, foreign-key, or check constraint rejected the write.
    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

/// SQLite reports `ON DELETE RESTRICT` as `SQLITE_CONSTRAINT_TRIGGER` (1811)
/// with this message, which sqlx does not classify as a foreign-key violation.
const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
                || db_err.message() == FOREIGN_KEY_FAILED
            {
                return Self::Conflict {
                    message: db_err.message().to_string(),
                };
            }
        }
        Self::Storage(err)
    }
}
