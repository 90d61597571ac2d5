//! The persisted outbox row.

use crate::codec;
use chrono::{DateTime, Utc};
use kudi_domain::DomainEvent;
use serde_json::Value;
use uuid::Uuid;

/// A pending (or processed) domain event row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxMessage {
    /// Row id (also the event id).
    pub id: Uuid,

    /// Event type tag.
    pub event_type: String,

    /// Tagged JSON payload.
    pub content: Value,

    /// When the event occurred.
    pub occurred_on: DateTime<Utc>,

    /// When delivery succeeded; `None` while pending.
    pub processed_on: Option<DateTime<Utc>>,

    /// Failed delivery attempts so far.
    pub retry_count: i32,

    /// Last delivery error, cleared on success.
    pub error: Option<String>,
}

impl OutboxMessage {
    /// Build a pending row from a domain event.
    pub fn from_event(event: &DomainEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: event.event_id(),
            event_type: event.type_name().to_string(),
            content: codec::encode(event)?,
            occurred_on: event.occurred_on(),
            processed_on: None,
            retry_count: 0,
            error: None,
        })
    }

    /// Decode the payload back into its event. `None` for unknown tags.
    pub fn decode(&self) -> Option<DomainEvent> {
        codec::decode(&self.content)
    }

    /// Mark delivery as succeeded.
    pub fn mark_processed(&mut self, now: DateTime<Utc>) {
        self.processed_on = Some(now);
        self.error = None;
    }

    /// Record a failed delivery attempt.
    pub fn record_failure(&mut self, message: &str) {
        self.retry_count += 1;
        self.error = Some(message.to_string());
    }

    pub fn is_pending(&self) -> bool {
        self.processed_on.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudi_domain::{
        AccountCreated, AccountId, AccountNumber, AccountType, Currency, CustomerId, Money,
    };

    fn sample_event() -> DomainEvent {
        DomainEvent::AccountCreated(AccountCreated::new(
            AccountId::new(),
            AccountNumber::parse("1234567890").unwrap(),
            CustomerId::new(),
            AccountType::Checking,
            Money::new(0, Currency::NGN),
            Utc::now(),
        ))
    }

    #[test]
    fn test_from_event_builds_pending_row() {
        let event = sample_event();
        let message = OutboxMessage::from_event(&event).unwrap();

        assert_eq!(message.id, event.event_id());
        assert_eq!(message.event_type, "AccountCreated");
        assert_eq!(message.occurred_on, event.occurred_on());
        assert!(message.is_pending());
        assert_eq!(message.retry_count, 0);
        assert!(message.error.is_none());
    }

    #[test]
    fn test_row_decodes_back_to_event() {
        let event = sample_event();
        let message = OutboxMessage::from_event(&event).unwrap();
        assert_eq!(message.decode(), Some(event));
    }

    #[test]
    fn test_retry_count_records_only_failures() {
        let mut message = OutboxMessage::from_event(&sample_event()).unwrap();

        message.record_failure("subscriber timed out");
        message.record_failure("subscriber timed out again");
        assert_eq!(message.retry_count, 2);
        assert!(message.error.is_some());

        // Success on the third attempt leaves the two failed attempts
        // recorded and clears the error.
        message.mark_processed(Utc::now());
        assert_eq!(message.retry_count, 2);
        assert!(message.error.is_none());
        assert!(!message.is_pending());
    }
}
