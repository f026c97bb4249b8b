use rusqlite::{ErrorCode, ffi};
use thiserror::Error;
use warbler_crypto::PasswordError;

#[derive(Debug, Error)]
pub enum DbError {
    /// UNIQUE, NOT NULL, PRIMARY KEY or FOREIGN KEY violation.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A value the column's CHECK constraint refuses, e.g. an over-long
    /// message.
    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("row not found")]
    NotFound,

    #[error("database lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl DbError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, DbError::Integrity(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, DbError::Data(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref code, ref msg) = err {
            if code.code == ErrorCode::ConstraintViolation {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                return match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_CHECK => DbError::Data(detail),
                    _ => DbError::Integrity(detail),
                };
            }
        }

        DbError::Sqlite(err)
    }
}
