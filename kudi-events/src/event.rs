//! Event and handler traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt::Debug;
use uuid::Uuid;

/// A domain event that can be routed through the bus.
pub trait Event: Send + Sync + Debug + 'static {
    /// Stable event type name (the outbox serialization tag).
    fn event_name(&self) -> &str;

    /// Unique id of this event occurrence.
    fn event_id(&self) -> Uuid;

    /// When the event occurred.
    fn occurred_on(&self) -> DateTime<Utc>;

    /// Cast to `Any` for downcasting by typed handlers.
    fn as_any(&self) -> &dyn Any;
}

/// Handler for one concrete event type.
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), EventHandlerError>;
}

/// Event handler error.
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("handler failed: {0}")]
    HandlerFailed(String),

    #[error("event processing error: {0}")]
    ProcessingError(String),
}

/// Type-erased event handler stored by the bus.
#[async_trait]
pub trait DynEventHandler: Send + Sync {
    async fn handle_dyn(&self, event: &dyn Event) -> Result<(), EventHandlerError>;
}

/// Adapter from a typed handler to the type-erased registry entry.
pub struct TypedEventHandler<E: Event, H: EventHandler<E>> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(&E)>,
}

impl<E: Event, H: EventHandler<E>> TypedEventHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<E: Event, H: EventHandler<E>> DynEventHandler for TypedEventHandler<E, H> {
    async fn handle_dyn(&self, event: &dyn Event) -> Result<(), EventHandlerError> {
        if let Some(typed_event) = event.as_any().downcast_ref::<E>() {
            self.handler.handle(typed_event).await
        } else {
            Err(EventHandlerError::ProcessingError(
                "event type mismatch".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Pinged {
        id: Uuid,
        at: DateTime<Utc>,
    }

    impl Event for Pinged {
        fn event_name(&self) -> &str {
            "Pinged"
        }

        fn event_id(&self) -> Uuid {
            self.id
        }

        fn occurred_on(&self) -> DateTime<Utc> {
            self.at
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct CountingHandler {
        hits: std::sync::Arc<std::sync::atomic::AtomicU32>,
    }

    #[async_trait]
    impl EventHandler<Pinged> for CountingHandler {
        async fn handle(&self, _event: &Pinged) -> Result<(), EventHandlerError> {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_typed_handler_downcasts() {
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let handler = TypedEventHandler::new(CountingHandler { hits: hits.clone() });

        let event = Pinged {
            id: Uuid::new_v4(),
            at: Utc::now(),
        };
        handler.handle_dyn(&event).await.unwrap();

        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
