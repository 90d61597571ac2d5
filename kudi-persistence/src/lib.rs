//! Postgres persistence for Kudi.
//!
//! Repositories are typed accessors over the pool; value objects map to
//! primitive columns through explicit conversions, soft-deleted rows are
//! invisible to every read, and account updates carry an optimistic
//! row-version check. The unit of work commits aggregate mutations and
//! their outbox rows in one transaction.

pub mod accounts;
pub mod customers;
pub mod database;
pub mod transactions;
pub mod unit_of_work;

pub use accounts::AccountRepository;
pub use customers::CustomerRepository;
pub use database::{connect, migrate, MIGRATOR};
pub use transactions::TransactionRepository;
pub use unit_of_work::UnitOfWork;

use kudi_domain::BankError;

/// Map a database error to the service taxonomy. Unique-constraint hits
/// surface as `Conflict` so racing writers get a retryable error; anything
/// else is `Internal`.
pub(crate) fn db_err(error: sqlx::Error) -> BankError {
    if let sqlx::Error::Database(ref db) = error {
        if db.code().as_deref() == Some("23505") {
            return BankError::Conflict(db.to_string());
        }
    }
    BankError::Internal(format!("database error: {error}"))
}
