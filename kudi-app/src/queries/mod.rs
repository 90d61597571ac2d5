//! Read-only queries and their handlers.

mod accounts;
mod customers;

pub use accounts::{
    GetAccountDetails, GetAccountDetailsHandler, GetTransactionHistory,
    GetTransactionHistoryHandler,
};
pub use customers::{
    GetCustomerDetails, GetCustomerDetailsHandler, GetCustomers, GetCustomersHandler,
};
