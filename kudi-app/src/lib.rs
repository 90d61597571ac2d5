//! The banking application layer: concrete commands, queries, handlers,
//! validators, and DTOs.
//!
//! Handlers are thin orchestrations: load aggregates from the repositories,
//! call aggregate methods, commit through a fresh unit of work, and hand
//! the committed events back to the pipeline for in-process dispatch.

pub mod commands;
pub mod dto;
pub mod queries;
pub mod subscribers;
pub mod validators;

pub use commands::{
    CreateAccount, CreateAccountHandler, CreateCustomer, CreateCustomerHandler, DepositMoney,
    DepositMoneyHandler, TransferMoney, TransferMoneyHandler, WithdrawMoney, WithdrawMoneyHandler,
};
pub use dto::{
    AccountDetailsDto, AccountSummaryDto, CustomerDetailsDto, CustomerDto, TransactionDto,
};
pub use queries::{
    GetAccountDetails, GetAccountDetailsHandler, GetCustomerDetails, GetCustomerDetailsHandler,
    GetCustomers, GetCustomersHandler, GetTransactionHistory, GetTransactionHistoryHandler,
};
pub use subscribers::EventAuditLog;
pub use validators::{CreateAccountValidator, CreateCustomerValidator, MoveMoneyRules};
