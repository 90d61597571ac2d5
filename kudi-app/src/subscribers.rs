//! Built-in event subscribers.

use async_trait::async_trait;
use kudi_domain::{AccountCreated, InsufficientFunds, MoneyTransferred};
use kudi_events::{EventBus, EventHandler, EventHandlerError, TypedEventHandler};
use tracing::{info, warn};

/// Writes an audit line for every domain event. Idempotent by nature, so it
/// is safe under the relay's at-least-once delivery.
#[derive(Debug, Clone, Default)]
pub struct EventAuditLog;

impl EventAuditLog {
    /// Subscribe the audit log to every event type.
    pub fn subscribe_all(bus: &EventBus) {
        bus.subscribe::<AccountCreated, _>(TypedEventHandler::new(EventAuditLog));
        bus.subscribe::<MoneyTransferred, _>(TypedEventHandler::new(EventAuditLog));
        bus.subscribe::<InsufficientFunds, _>(TypedEventHandler::new(EventAuditLog));
    }
}

#[async_trait]
impl EventHandler<AccountCreated> for EventAuditLog {
    async fn handle(&self, event: &AccountCreated) -> Result<(), EventHandlerError> {
        info!(
            event_id = %event.event_id,
            account = %event.account_number,
            customer = %event.customer_id,
            account_type = %event.account_type,
            "account created"
        );
        Ok(())
    }
}

#[async_trait]
impl EventHandler<MoneyTransferred> for EventAuditLog {
    async fn handle(&self, event: &MoneyTransferred) -> Result<(), EventHandlerError> {
        info!(
            event_id = %event.event_id,
            source = %event.source_account_number,
            destination = %event.destination_account_number,
            amount = %event.amount,
            reference = %event.reference,
            "money transferred"
        );
        Ok(())
    }
}

#[async_trait]
impl EventHandler<InsufficientFunds> for EventAuditLog {
    async fn handle(&self, event: &InsufficientFunds) -> Result<(), EventHandlerError> {
        warn!(
            event_id = %event.event_id,
            account = %event.account_number,
            requested = %event.requested_amount,
            available = %event.current_balance,
            operation = %event.operation,
            "insufficient funds"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kudi_domain::{AccountId, AccountNumber, AccountType, Currency, CustomerId, Money};

    #[tokio::test]
    async fn test_audit_log_subscribes_to_every_event_type() {
        let bus = EventBus::new();
        EventAuditLog::subscribe_all(&bus);

        assert_eq!(bus.subscriber_count::<AccountCreated>(), 1);
        assert_eq!(bus.subscriber_count::<MoneyTransferred>(), 1);
        assert_eq!(bus.subscriber_count::<InsufficientFunds>(), 1);

        let event = AccountCreated::new(
            AccountId::new(),
            AccountNumber::parse("1234567890").unwrap(),
            CustomerId::new(),
            AccountType::Savings,
            Money::new(0, Currency::NGN),
            Utc::now(),
        );
        assert!(bus.publish(&event).await.is_ok());
    }
}
