//! Account opening.

use async_trait::async_trait;
use chrono::Utc;
use kudi_cqrs::{Command, CommandHandler, Executed};
use kudi_domain::{Account, AccountId, AccountNumber, AccountType, BankError, Currency, CustomerId, Money};
use kudi_persistence::{AccountRepository, CustomerRepository, UnitOfWork};
use sqlx::PgPool;
use tracing::debug;

/// Open an account for an existing customer.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub customer_id: CustomerId,
    pub account_type: AccountType,
    /// Minor units of `currency`.
    pub initial_deposit: i64,
    pub currency: String,
}

impl Command for CreateAccount {
    type Output = AccountId;

    fn name() -> &'static str {
        "CreateAccount"
    }
}

pub struct CreateAccountHandler {
    customers: CustomerRepository,
    accounts: AccountRepository,
    pool: PgPool,
}

impl CreateAccountHandler {
    /// Candidate account numbers tried before giving up.
    const NUMBER_ATTEMPTS: u32 = 10;

    pub fn new(customers: CustomerRepository, accounts: AccountRepository, pool: PgPool) -> Self {
        Self {
            customers,
            accounts,
            pool,
        }
    }

    /// Draw random candidates until one is unused, giving up after a bounded
    /// number of attempts.
    async fn unique_account_number(&self) -> Result<AccountNumber, BankError> {
        for attempt in 0..Self::NUMBER_ATTEMPTS {
            let candidate = AccountNumber::generate(&mut rand::rng());
            if !self.accounts.number_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!(attempt, "account number collision, retrying");
        }
        Err(BankError::Internal(format!(
            "could not find a free account number in {} attempts",
            Self::NUMBER_ATTEMPTS
        )))
    }
}

#[async_trait]
impl CommandHandler<CreateAccount> for CreateAccountHandler {
    async fn handle(&self, command: CreateAccount) -> Result<Executed<AccountId>, BankError> {
        let currency = Currency::from_code(&command.currency).ok_or_else(|| {
            BankError::validation("currency", format!("unknown currency {}", command.currency))
        })?;

        if !self.customers.exists(command.customer_id).await? {
            return Err(BankError::not_found("customer", command.customer_id));
        }

        let account_number = self.unique_account_number().await?;
        let account = Account::open(
            command.customer_id,
            account_number,
            command.account_type,
            Money::new(command.initial_deposit, currency),
            Utc::now(),
        )?;
        let account_id = account.id();

        let mut uow = UnitOfWork::new(self.pool.clone());
        uow.track_new_account(account);
        let events = uow.commit().await?;

        Ok(Executed::with_events(account_id, events))
    }
}
