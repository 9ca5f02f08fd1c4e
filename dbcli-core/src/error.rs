//! Error types for dbcli operations.
//!
//! Every gateway operation returns [`DbCliError`] on failure. The binary
//! prints the error through the presenter instead of propagating it to the
//! process exit status, so the display text of each variant is what users
//! see. No variant ever carries the configured password.

use thiserror::Error;

/// Main error type for dbcli operations.
#[derive(Debug, Error)]
pub enum DbCliError {
    /// Configuration file missing, unreadable, or lacking the requested section
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Opening the database connection failed (network, auth, driver)
    #[error("Database connection failed: {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// Statement rejected by the server (syntax, constraint, missing object)
    #[error("Statement failed: {context}: {source}")]
    Statement {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// Caller-supplied value that cannot be used
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with DbCliError
pub type Result<T> = std::result::Result<T, DbCliError>;

impl DbCliError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a connection error with context
    pub fn connection_failed(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Connection {
            context: context.into(),
            source,
        }
    }

    /// Creates a statement error with context
    pub fn statement_failed(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Statement {
            context: context.into(),
            source,
        }
    }

    /// Creates an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
