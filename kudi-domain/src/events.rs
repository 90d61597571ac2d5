//! Domain events emitted by the account aggregate.
//!
//! Events are modeled as a tagged sum type: the serialized form carries a
//! `type` discriminator and round-trips through the outbox. Each variant
//! struct also implements [`kudi_events::Event`], so the in-process bus can
//! route it by concrete type.

use crate::account::AccountType;
use crate::value::{AccountId, AccountNumber, CustomerId, Money, TransactionId};
use chrono::{DateTime, Utc};
use kudi_events::Event;
use serde::{Deserialize, Serialize};
use std::any::Any;
use uuid::Uuid;

/// A new account was opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCreated {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub account_id: AccountId,
    pub account_number: AccountNumber,
    pub customer_id: CustomerId,
    pub account_type: AccountType,
    pub initial_deposit: Money,
}

impl AccountCreated {
    pub fn new(
        account_id: AccountId,
        account_number: AccountNumber,
        customer_id: CustomerId,
        account_type: AccountType,
        initial_deposit: Money,
        occurred_on: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_on,
            account_id,
            account_number,
            customer_id,
            account_type,
            initial_deposit,
        }
    }
}

/// Money moved between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyTransferred {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub transaction_id: TransactionId,
    pub source_account_number: AccountNumber,
    pub destination_account_number: AccountNumber,
    pub amount: Money,
    pub reference: String,
    pub transfer_date: DateTime<Utc>,
}

/// A debit was requested that the balance could not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsufficientFunds {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub account_number: AccountNumber,
    pub requested_amount: Money,
    pub current_balance: Money,
    pub operation: String,
}

impl InsufficientFunds {
    pub fn new(
        account_number: AccountNumber,
        requested_amount: Money,
        current_balance: Money,
        operation: &str,
        occurred_on: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_on,
            account_number,
            requested_amount,
            current_balance,
            operation: operation.to_string(),
        }
    }
}

/// The closed set of domain events, tagged for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    AccountCreated(AccountCreated),
    MoneyTransferred(MoneyTransferred),
    InsufficientFunds(InsufficientFunds),
}

impl DomainEvent {
    /// Stable serialization tag for this event.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AccountCreated(_) => "AccountCreated",
            Self::MoneyTransferred(_) => "MoneyTransferred",
            Self::InsufficientFunds(_) => "InsufficientFunds",
        }
    }

    pub fn event_id(&self) -> Uuid {
        match self {
            Self::AccountCreated(e) => e.event_id,
            Self::MoneyTransferred(e) => e.event_id,
            Self::InsufficientFunds(e) => e.event_id,
        }
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            Self::AccountCreated(e) => e.occurred_on,
            Self::MoneyTransferred(e) => e.occurred_on,
            Self::InsufficientFunds(e) => e.occurred_on,
        }
    }

    /// View the inner variant as a bus-routable event.
    pub fn as_event(&self) -> &dyn Event {
        match self {
            Self::AccountCreated(e) => e,
            Self::MoneyTransferred(e) => e,
            Self::InsufficientFunds(e) => e,
        }
    }
}

macro_rules! impl_event {
    ($name:ident) => {
        impl Event for $name {
            fn event_name(&self) -> &str {
                stringify!($name)
            }

            fn event_id(&self) -> Uuid {
                self.event_id
            }

            fn occurred_on(&self) -> DateTime<Utc> {
                self.occurred_on
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_event!(AccountCreated);
impl_event!(MoneyTransferred);
impl_event!(InsufficientFunds);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Currency;

    fn naira(amount: i64) -> Money {
        Money::new(amount, Currency::NGN)
    }

    fn number(value: &str) -> AccountNumber {
        AccountNumber::parse(value).unwrap()
    }

    #[test]
    fn test_tagged_serialization() {
        let event = DomainEvent::AccountCreated(AccountCreated::new(
            AccountId::new(),
            number("1234567890"),
            CustomerId::new(),
            AccountType::Savings,
            naira(10_000),
            Utc::now(),
        ));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AccountCreated");
        assert_eq!(json["account_number"], "1234567890");
    }

    #[test]
    fn test_round_trip_all_variants() {
        let events = vec![
            DomainEvent::AccountCreated(AccountCreated::new(
                AccountId::new(),
                number("1234567890"),
                CustomerId::new(),
                AccountType::Checking,
                naira(0),
                Utc::now(),
            )),
            DomainEvent::MoneyTransferred(MoneyTransferred {
                event_id: Uuid::new_v4(),
                occurred_on: Utc::now(),
                transaction_id: TransactionId::new(),
                source_account_number: number("1234567890"),
                destination_account_number: number("9876543210"),
                amount: naira(20_000),
                reference: "R1".into(),
                transfer_date: Utc::now(),
            }),
            DomainEvent::InsufficientFunds(InsufficientFunds::new(
                number("1234567890"),
                naira(5_000),
                naira(100),
                "Withdraw",
                Utc::now(),
            )),
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            let back: DomainEvent = serde_json::from_value(json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn test_type_name_matches_tag() {
        let event = DomainEvent::InsufficientFunds(InsufficientFunds::new(
            number("1234567890"),
            naira(1),
            naira(0),
            "Transfer",
            Utc::now(),
        ));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.type_name());
    }

    #[test]
    fn test_as_event_routes_to_concrete_type() {
        let inner = InsufficientFunds::new(number("1234567890"), naira(1), naira(0), "Withdraw", Utc::now());
        let event = DomainEvent::InsufficientFunds(inner.clone());

        let dyn_event = event.as_event();
        assert_eq!(dyn_event.event_name(), "InsufficientFunds");
        assert_eq!(dyn_event.event_id(), inner.event_id);
        assert!(dyn_event.as_any().downcast_ref::<InsufficientFunds>().is_some());
    }

    #[test]
    fn test_every_event_carries_id_and_timestamp() {
        let event = DomainEvent::AccountCreated(AccountCreated::new(
            AccountId::new(),
            number("5555555555"),
            CustomerId::new(),
            AccountType::FixedDeposit,
            naira(1_000_000),
            Utc::now(),
        ));
        assert_ne!(event.event_id(), Uuid::nil());
        assert!(event.occurred_on() <= Utc::now());
    }
}
