//! Crate-level error types
//!
//! Errors raised by configuration loading and pool construction live here;
//! repository operations carry their own structured error,
//! [`crate::repository::RepositoryError`].

use thiserror::Error;

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Setup-time error
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Failed to establish the database connection pool
    #[error("Database connection error: {0}")]
    Connection(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let error = Error::Connection("refused".to_string());
        assert_eq!(format!("{error}"), "Database connection error: refused");
    }
}
