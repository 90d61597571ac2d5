//! Account projections.

use crate::dto::{AccountDetailsDto, TransactionDto};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kudi_cqrs::{Query, QueryHandler};
use kudi_domain::{AccountId, AccountNumber, BankError};
use kudi_persistence::{AccountRepository, CustomerRepository, TransactionRepository};

/// Look up an account by number.
#[derive(Debug, Clone)]
pub struct GetAccountDetails {
    pub account_number: String,
}

impl Query for GetAccountDetails {
    type Output = AccountDetailsDto;

    fn name() -> &'static str {
        "GetAccountDetails"
    }
}

pub struct GetAccountDetailsHandler {
    accounts: AccountRepository,
    customers: CustomerRepository,
}

impl GetAccountDetailsHandler {
    pub fn new(accounts: AccountRepository, customers: CustomerRepository) -> Self {
        Self { accounts, customers }
    }
}

#[async_trait]
impl QueryHandler<GetAccountDetails> for GetAccountDetailsHandler {
    async fn handle(&self, query: GetAccountDetails) -> Result<AccountDetailsDto, BankError> {
        let account_number = AccountNumber::parse(&query.account_number)
            .map_err(|e| BankError::validation("account_number", e.to_string()))?;

        let account = self
            .accounts
            .find_by_number(&account_number)
            .await?
            .ok_or_else(|| BankError::not_found("account", &account_number))?;
        let owner = self
            .customers
            .find(account.customer_id())
            .await?
            .ok_or_else(|| BankError::not_found("customer", account.customer_id()))?;

        Ok(AccountDetailsDto::from_domain(&account, &owner))
    }
}

/// Ordered transaction history for an account window.
#[derive(Debug, Clone)]
pub struct GetTransactionHistory {
    pub account_id: AccountId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Query for GetTransactionHistory {
    type Output = Vec<TransactionDto>;

    fn name() -> &'static str {
        "GetTransactionHistory"
    }
}

pub struct GetTransactionHistoryHandler {
    transactions: TransactionRepository,
}

impl GetTransactionHistoryHandler {
    pub fn new(transactions: TransactionRepository) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl QueryHandler<GetTransactionHistory> for GetTransactionHistoryHandler {
    async fn handle(&self, query: GetTransactionHistory) -> Result<Vec<TransactionDto>, BankError> {
        let transactions = self
            .transactions
            .find_for_account_between(query.account_id, query.start, query.end)
            .await?;
        Ok(transactions.iter().map(TransactionDto::from_domain).collect())
    }
}
