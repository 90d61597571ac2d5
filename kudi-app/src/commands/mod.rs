//! State-changing commands and their handlers.

mod create_account;
mod create_customer;
mod move_money;
mod transfer_money;

pub use create_account::{CreateAccount, CreateAccountHandler};
pub use create_customer::{CreateCustomer, CreateCustomerHandler};
pub use move_money::{DepositMoney, DepositMoneyHandler, WithdrawMoney, WithdrawMoneyHandler};
pub use transfer_money::{TransferMoney, TransferMoneyHandler};
