//! Projection DTOs returned by the query handlers.

use chrono::{DateTime, NaiveDate, Utc};
use kudi_domain::{Account, Customer, Transaction};
use serde::Serialize;
use uuid::Uuid;

/// Account details joined with the owner's name.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetailsDto {
    pub account_number: String,
    pub account_type: String,
    pub balance: i64,
    pub currency: String,
    pub date_opened: DateTime<Utc>,
    pub is_active: bool,
    pub owner_name: String,
}

impl AccountDetailsDto {
    pub fn from_domain(account: &Account, owner: &Customer) -> Self {
        Self {
            account_number: account.account_number().to_string(),
            account_type: account.account_type().as_str().to_string(),
            balance: account.balance().amount,
            currency: account.balance().currency.code().to_string(),
            date_opened: account.date_opened(),
            is_active: account.is_active(),
            owner_name: owner.full_name(),
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDto {
    pub id: Uuid,
    pub transaction_type: String,
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub reference: String,
}

impl TransactionDto {
    pub fn from_domain(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id().as_uuid(),
            transaction_type: transaction.transaction_type().as_str().to_string(),
            amount: transaction.amount().amount,
            currency: transaction.amount().currency.code().to_string(),
            description: transaction.description().to_string(),
            timestamp: transaction.timestamp(),
            reference: transaction.reference().to_string(),
        }
    }
}

/// Customer list row.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
}

impl CustomerDto {
    pub fn from_domain(customer: &Customer) -> Self {
        Self {
            id: customer.id().as_uuid(),
            full_name: customer.full_name(),
            email: customer.email().to_string(),
            phone: customer.phone().to_string(),
            is_active: customer.is_active(),
            date_created: customer.date_created(),
        }
    }
}

/// Summary of one owned account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummaryDto {
    pub account_number: String,
    pub account_type: String,
    pub balance: i64,
    pub currency: String,
    pub status: String,
}

impl AccountSummaryDto {
    pub fn from_domain(account: &Account) -> Self {
        Self {
            account_number: account.account_number().to_string(),
            account_type: account.account_type().as_str().to_string(),
            balance: account.balance().amount,
            currency: account.balance().currency.code().to_string(),
            status: account.status().as_str().to_string(),
        }
    }
}

/// Customer details with owned account summaries.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetailsDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub email_opt_in: bool,
    pub is_active: bool,
    pub accounts: Vec<AccountSummaryDto>,
}

impl CustomerDetailsDto {
    pub fn from_domain(customer: &Customer, accounts: &[Account]) -> Self {
        Self {
            id: customer.id().as_uuid(),
            full_name: customer.full_name(),
            email: customer.email().to_string(),
            phone: customer.phone().to_string(),
            address: customer.address().to_string(),
            date_of_birth: customer.date_of_birth(),
            email_opt_in: customer.email_opt_in(),
            is_active: customer.is_active(),
            accounts: accounts.iter().map(AccountSummaryDto::from_domain).collect(),
        }
    }
}
