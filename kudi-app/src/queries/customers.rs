//! Customer projections.

use crate::dto::{CustomerDetailsDto, CustomerDto};
use async_trait::async_trait;
use kudi_cqrs::{Query, QueryHandler};
use kudi_domain::{BankError, CustomerId};
use kudi_persistence::{AccountRepository, CustomerRepository};

/// List every customer.
#[derive(Debug, Clone)]
pub struct GetCustomers;

impl Query for GetCustomers {
    type Output = Vec<CustomerDto>;

    fn name() -> &'static str {
        "GetCustomers"
    }
}

pub struct GetCustomersHandler {
    customers: CustomerRepository,
}

impl GetCustomersHandler {
    pub fn new(customers: CustomerRepository) -> Self {
        Self { customers }
    }
}

#[async_trait]
impl QueryHandler<GetCustomers> for GetCustomersHandler {
    async fn handle(&self, _query: GetCustomers) -> Result<Vec<CustomerDto>, BankError> {
        let customers = self.customers.list_all().await?;
        Ok(customers.iter().map(CustomerDto::from_domain).collect())
    }
}

/// One customer with owned-account summaries.
#[derive(Debug, Clone)]
pub struct GetCustomerDetails {
    pub customer_id: CustomerId,
}

impl Query for GetCustomerDetails {
    type Output = CustomerDetailsDto;

    fn name() -> &'static str {
        "GetCustomerDetails"
    }
}

pub struct GetCustomerDetailsHandler {
    customers: CustomerRepository,
    accounts: AccountRepository,
}

impl GetCustomerDetailsHandler {
    pub fn new(customers: CustomerRepository, accounts: AccountRepository) -> Self {
        Self { customers, accounts }
    }
}

#[async_trait]
impl QueryHandler<GetCustomerDetails> for GetCustomerDetailsHandler {
    async fn handle(&self, query: GetCustomerDetails) -> Result<CustomerDetailsDto, BankError> {
        let customer = self
            .customers
            .find(query.customer_id)
            .await?
            .ok_or_else(|| BankError::not_found("customer", query.customer_id))?;
        let accounts = self.accounts.find_for_customer(query.customer_id).await?;

        Ok(CustomerDetailsDto::from_domain(&customer, &accounts))
    }
}
