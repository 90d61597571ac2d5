//! Error types for outbox operations.

use thiserror::Error;

/// Result type for outbox operations.
pub type OutboxResult<T> = Result<T, OutboxError>;

/// Outbox-specific errors.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Event serialization error
    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Relay already running
    #[error("relay already running")]
    AlreadyRunning,

    /// Relay not running
    #[error("relay not running")]
    NotRunning,
}
