//! Customer, account, and transaction aggregates for Kudi.
//!
//! The account is the aggregate root of the write path: every balance
//! mutation happens through one of its methods, which either mutate and
//! append child transactions (and, for the event-emitting operations, queue
//! domain events) or return a typed [`BankError`]. Aggregate methods are
//! deterministic over their inputs and current state; they perform no I/O
//! and no logging, and the clock is always an explicit argument.
//!
//! Pending events live in an in-memory queue on the account, readable
//! through [`account::Account::pending_events`] and drained only by the unit
//! of work on a successful commit.

pub mod account;
pub mod customer;
pub mod error;
pub mod events;
pub mod transaction;
pub mod value;

pub use account::{Account, AccountStatus, AccountType, TransferReceipt};
pub use customer::Customer;
pub use error::BankError;
pub use events::{AccountCreated, DomainEvent, InsufficientFunds, MoneyTransferred};
pub use transaction::{Transaction, TransactionType};
pub use value::{AccountId, AccountNumber, Currency, CustomerId, Money, TransactionId};
