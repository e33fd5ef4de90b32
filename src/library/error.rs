use rusqlite::ffi;
use thiserror::Error;

/// Failure taxonomy for library store operations. Callers can branch on the
/// variant; the HTTP layer maps each to a status code.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A uniqueness rule was broken (duplicate natural key).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A referenced parent row does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Input rejected before touching the database.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

// SQLite reports which rule failed through the extended result code, so
// constraint breaks classify here and every other failure stays Database.
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(sqlite_err, ref message) = err {
            let detail = || {
                message
                    .clone()
                    .unwrap_or_else(|| sqlite_err.to_string())
            };
            match sqlite_err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::ConstraintViolation(detail());
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::ForeignKeyViolation(detail());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
