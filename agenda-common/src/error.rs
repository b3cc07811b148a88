//! Common error types for Agenda

use thiserror::Error;

/// Common result type for Agenda operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the web service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint violated (email or CPF already registered)
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a sqlx error, turning unique-constraint violations into [`Error::Duplicate`]
    ///
    /// The offending column is taken from the SQLite message
    /// (`UNIQUE constraint failed: contacts.email`).
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let column = db_err
                    .message()
                    .rsplit('.')
                    .next()
                    .unwrap_or("record")
                    .trim()
                    .to_string();
                return Error::Duplicate(column);
            }
        }
        Error::Database(err)
    }

    /// True when the error is a validation or duplicate error a user can fix
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Duplicate(_))
    }
}
