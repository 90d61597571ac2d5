//! Error types for the job runtime.

use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payload (de)serialization error
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid cron expression
    #[error("invalid cron expression: {0}")]
    InvalidExpression(String),

    /// Job not found
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Recurring job not found
    #[error("recurring job not found: {0}")]
    RecurringNotFound(String),

    /// Job execution failed
    #[error("job execution failed: {0}")]
    ExecutionFailed(String),

    /// No handler registered for a job type
    #[error("no handler registered for job type: {0}")]
    NoHandler(String),

    /// Job execution exceeded its timeout
    #[error("job timed out")]
    Timeout,

    /// Worker pool already running
    #[error("worker pool already running")]
    AlreadyRunning,

    /// Worker pool not running
    #[error("worker pool not running")]
    NotRunning,
}
