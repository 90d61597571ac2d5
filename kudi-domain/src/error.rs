//! The error taxonomy surfaced by the command/query pipeline.

use crate::value::{AccountNumber, Money};
use kudi_validation::{ValidationError, ValidationErrors};
use thiserror::Error;

/// Failures a banking operation can surface to its caller.
///
/// Domain methods recover nothing locally: they return one of these and the
/// pipeline passes it through verbatim. Background components (relay,
/// scheduler) retry the retriable kinds up to their bound and quarantine the
/// rest.
#[derive(Debug, Error)]
pub enum BankError {
    /// A pre-condition on the input was violated; carries every violation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The referenced entity does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The balance does not cover the requested amount.
    #[error("insufficient funds on account {account_number}: requested {requested}, available {available}")]
    InsufficientFunds {
        account_number: AccountNumber,
        requested: Money,
        available: Money,
    },

    /// The savings monthly withdrawal cap was reached.
    #[error("withdrawal limit reached on account {account_number}: at most {limit} withdrawals per calendar month")]
    WithdrawalLimit {
        account_number: AccountNumber,
        limit: u32,
    },

    /// Optimistic concurrency token mismatch; the caller may retry.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// A state-machine rule forbids the operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Unexpected I/O, serialization, or invariant break.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BankError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a single-violation `Validation` error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message).into())
    }

    /// Whether a caller retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<ValidationErrors> for BankError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ValidationError> for BankError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}
