//! The customer aggregate.

use crate::account::Account;
use crate::error::BankError;
use crate::value::CustomerId;
use chrono::{DateTime, NaiveDate, Utc};

/// A bank customer. Owns accounts by id; the collection is loaded only when
/// an operation needs it, and passed in explicitly.
#[derive(Debug, Clone)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address: String,
    date_of_birth: NaiveDate,
    bvn: String,
    credit_score: i32,
    email_opt_in: bool,
    date_created: DateTime<Utc>,
    is_active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl Customer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: &str,
        address: &str,
        date_of_birth: NaiveDate,
        bvn: &str,
        credit_score: i32,
        email_opt_in: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CustomerId::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            date_of_birth,
            bvn: bvn.to_string(),
            credit_score,
            email_opt_in,
            date_created: now,
            is_active: true,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Deactivate the customer. Refused while any owned account still holds
    /// money.
    pub fn deactivate(&mut self, accounts: &[Account]) -> Result<(), BankError> {
        self.ensure_no_funded_accounts(accounts)?;
        self.is_active = false;
        Ok(())
    }

    /// Soft-delete the customer. Same funded-account guard as deactivation.
    pub fn soft_delete(
        &mut self,
        accounts: &[Account],
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), BankError> {
        self.ensure_no_funded_accounts(accounts)?;
        self.is_deleted = true;
        self.is_active = false;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor.to_string());
        Ok(())
    }

    fn ensure_no_funded_accounts(&self, accounts: &[Account]) -> Result<(), BankError> {
        for account in accounts {
            if account.customer_id() == self.id && !account.is_deleted() && !account.balance().is_zero()
            {
                return Err(BankError::InvalidOperation(format!(
                    "customer {} still holds funds on account {}",
                    self.id,
                    account.account_number()
                )));
            }
        }
        Ok(())
    }

    /// Update contact details.
    pub fn update_contact(&mut self, phone: &str, address: &str) {
        self.phone = phone.to_string();
        self.address = address.to_string();
    }

    pub fn set_email_opt_in(&mut self, opt_in: bool) {
        self.email_opt_in = opt_in;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn bvn(&self) -> &str {
        &self.bvn
    }

    pub fn credit_score(&self) -> i32 {
        self.credit_score
    }

    pub fn email_opt_in(&self) -> bool {
        self.email_opt_in
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.deleted_by.as_deref()
    }

    /// Reconstruct a persisted customer. Used by the repositories.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: CustomerId,
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        address: String,
        date_of_birth: NaiveDate,
        bvn: String,
        credit_score: i32,
        email_opt_in: bool,
        date_created: DateTime<Utc>,
        is_active: bool,
        is_deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
        deleted_by: Option<String>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            phone,
            address,
            date_of_birth,
            bvn,
            credit_score,
            email_opt_in,
            date_created,
            is_active,
            is_deleted,
            deleted_at,
            deleted_by,
        }
    }
}
