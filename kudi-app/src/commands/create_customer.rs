//! Customer onboarding.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use kudi_cqrs::{Command, CommandHandler, Executed};
use kudi_domain::{BankError, Customer, CustomerId};
use kudi_persistence::{CustomerRepository, UnitOfWork};
use sqlx::PgPool;

/// Register a new customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub bvn: String,
    pub credit_score: i32,
    pub email_opt_in: bool,
}

impl Command for CreateCustomer {
    type Output = CustomerId;

    fn name() -> &'static str {
        "CreateCustomer"
    }
}

pub struct CreateCustomerHandler {
    customers: CustomerRepository,
    pool: PgPool,
}

impl CreateCustomerHandler {
    pub fn new(customers: CustomerRepository, pool: PgPool) -> Self {
        Self { customers, pool }
    }
}

#[async_trait]
impl CommandHandler<CreateCustomer> for CreateCustomerHandler {
    async fn handle(&self, command: CreateCustomer) -> Result<Executed<CustomerId>, BankError> {
        if self.customers.email_exists(&command.email).await? {
            return Err(BankError::validation(
                "email",
                "email is already registered",
            ));
        }

        let customer = Customer::new(
            &command.first_name,
            &command.last_name,
            &command.email,
            &command.phone,
            &command.address,
            command.date_of_birth,
            &command.bvn,
            command.credit_score,
            command.email_opt_in,
            Utc::now(),
        );
        let customer_id = customer.id();

        let mut uow = UnitOfWork::new(self.pool.clone());
        uow.track_new_customer(customer);
        let events = uow.commit().await?;

        Ok(Executed::with_events(customer_id, events))
    }
}
