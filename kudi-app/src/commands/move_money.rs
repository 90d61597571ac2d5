//! Single-account deposits and withdrawals.

use async_trait::async_trait;
use chrono::Utc;
use kudi_cqrs::{Command, CommandHandler, Executed};
use kudi_domain::{AccountNumber, BankError, Currency, Money, TransactionId};
use kudi_persistence::{AccountRepository, UnitOfWork};
use sqlx::PgPool;
use tracing::warn;

/// Credit an account.
#[derive(Debug, Clone)]
pub struct DepositMoney {
    pub account_number: String,
    /// Minor units of `currency`.
    pub amount: i64,
    pub currency: String,
    pub description: String,
}

impl Command for DepositMoney {
    type Output = TransactionId;

    fn name() -> &'static str {
        "DepositMoney"
    }
}

/// Debit an account.
#[derive(Debug, Clone)]
pub struct WithdrawMoney {
    pub account_number: String,
    /// Minor units of `currency`.
    pub amount: i64,
    pub currency: String,
    pub description: String,
}

impl Command for WithdrawMoney {
    type Output = TransactionId;

    fn name() -> &'static str {
        "WithdrawMoney"
    }
}

fn parse_amount(number: &str, amount: i64, currency: &str) -> Result<(AccountNumber, Money), BankError> {
    let account_number = AccountNumber::parse(number)
        .map_err(|e| BankError::validation("account_number", e.to_string()))?;
    let currency = Currency::from_code(currency)
        .ok_or_else(|| BankError::validation("currency", format!("unknown currency {currency}")))?;
    Ok((account_number, Money::new(amount, currency)))
}

pub struct DepositMoneyHandler {
    accounts: AccountRepository,
    pool: PgPool,
}

impl DepositMoneyHandler {
    pub fn new(accounts: AccountRepository, pool: PgPool) -> Self {
        Self { accounts, pool }
    }
}

#[async_trait]
impl CommandHandler<DepositMoney> for DepositMoneyHandler {
    async fn handle(&self, command: DepositMoney) -> Result<Executed<TransactionId>, BankError> {
        let (account_number, amount) =
            parse_amount(&command.account_number, command.amount, &command.currency)?;

        let mut account = self
            .accounts
            .find_by_number(&account_number)
            .await?
            .ok_or_else(|| BankError::not_found("account", &account_number))?;

        let transaction = account.deposit(amount, &command.description, Utc::now())?;
        let transaction_id = transaction.id();

        let mut uow = UnitOfWork::new(self.pool.clone());
        uow.track_account(account);
        let events = uow.commit().await?;

        Ok(Executed::with_events(transaction_id, events))
    }
}

pub struct WithdrawMoneyHandler {
    accounts: AccountRepository,
    pool: PgPool,
}

impl WithdrawMoneyHandler {
    pub fn new(accounts: AccountRepository, pool: PgPool) -> Self {
        Self { accounts, pool }
    }
}

#[async_trait]
impl CommandHandler<WithdrawMoney> for WithdrawMoneyHandler {
    async fn handle(&self, command: WithdrawMoney) -> Result<Executed<TransactionId>, BankError> {
        let (account_number, amount) =
            parse_amount(&command.account_number, command.amount, &command.currency)?;

        let mut account = self
            .accounts
            .find_by_number(&account_number)
            .await?
            .ok_or_else(|| BankError::not_found("account", &account_number))?;

        match account.withdraw(amount, &command.description, Utc::now()) {
            Ok(transaction) => {
                let transaction_id = transaction.id();
                let mut uow = UnitOfWork::new(self.pool.clone());
                uow.track_account(account);
                let events = uow.commit().await?;
                Ok(Executed::with_events(transaction_id, events))
            }
            Err(error @ BankError::InsufficientFunds { .. }) => {
                // Record the refusal event without touching the balance.
                let mut uow = UnitOfWork::new(self.pool.clone());
                uow.track_account(account);
                if let Err(commit_error) = uow.commit().await {
                    warn!(error = %commit_error, "failed to record insufficient-funds event");
                }
                Err(error)
            }
            Err(error) => Err(error),
        }
    }
}
