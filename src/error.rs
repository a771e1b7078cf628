//! Error types and handling.

use thiserror::Error;

/// Application-wide error type.
///
/// Protocol-level rejects (bad fields, bad checksums) are not errors here: they
/// travel as reply codes to the device. This type covers failures of the
/// server itself.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Socket or file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Persistence collaborator rejected an operation
    #[error("Store error: {0}")]
    Store(String),

    /// Background task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a store error with message
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a task error with message
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
