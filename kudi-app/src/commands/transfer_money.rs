//! Money transfer between accounts.

use async_trait::async_trait;
use chrono::Utc;
use kudi_cqrs::{Command, CommandHandler, Executed};
use kudi_domain::{AccountNumber, BankError, Currency, Money, TransferReceipt};
use kudi_persistence::{AccountRepository, UnitOfWork};
use sqlx::PgPool;
use tracing::warn;

/// Move money from one account to another.
#[derive(Debug, Clone)]
pub struct TransferMoney {
    pub source_number: String,
    pub destination_number: String,
    /// Minor units of `currency`.
    pub amount: i64,
    pub currency: String,
    pub reference: String,
    pub description: String,
}

impl Command for TransferMoney {
    type Output = TransferReceipt;

    fn name() -> &'static str {
        "TransferMoney"
    }
}

pub struct TransferMoneyHandler {
    accounts: AccountRepository,
    pool: PgPool,
}

impl TransferMoneyHandler {
    pub fn new(accounts: AccountRepository, pool: PgPool) -> Self {
        Self { accounts, pool }
    }
}

#[async_trait]
impl CommandHandler<TransferMoney> for TransferMoneyHandler {
    async fn handle(&self, command: TransferMoney) -> Result<Executed<TransferReceipt>, BankError> {
        let source_number = AccountNumber::parse(&command.source_number)
            .map_err(|e| BankError::validation("source_number", e.to_string()))?;
        let destination_number = AccountNumber::parse(&command.destination_number)
            .map_err(|e| BankError::validation("destination_number", e.to_string()))?;
        let currency = Currency::from_code(&command.currency).ok_or_else(|| {
            BankError::validation("currency", format!("unknown currency {}", command.currency))
        })?;
        let amount = Money::new(command.amount, currency);

        let mut source = self
            .accounts
            .find_by_number(&source_number)
            .await?
            .ok_or_else(|| BankError::not_found("account", &source_number))?;
        let mut destination = self
            .accounts
            .find_by_number(&destination_number)
            .await?
            .ok_or_else(|| BankError::not_found("account", &destination_number))?;

        match source.transfer_to(
            &mut destination,
            amount,
            &command.reference,
            &command.description,
            Utc::now(),
        ) {
            Ok(receipt) => {
                let mut uow = UnitOfWork::new(self.pool.clone());
                uow.track_account(source);
                uow.track_account(destination);
                let events = uow.commit().await?;
                Ok(Executed::with_events(receipt, events))
            }
            Err(error @ BankError::InsufficientFunds { .. }) => {
                // The refusal event still goes through the outbox; balances
                // were not touched, so committing the source is safe.
                let mut uow = UnitOfWork::new(self.pool.clone());
                uow.track_account(source);
                if let Err(commit_error) = uow.commit().await {
                    warn!(error = %commit_error, "failed to record insufficient-funds event");
                }
                Err(error)
            }
            Err(error) => Err(error),
        }
    }
}
