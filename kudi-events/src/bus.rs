//! Event bus implementation

use crate::event::{DynEventHandler, Event, EventHandlerError};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, error};

/// In-process event bus.
///
/// Subscribers are keyed by the concrete event type and invoked sequentially
/// in registration order on the publishing task. Every subscriber runs even
/// when an earlier one fails; failures are collected into the returned error.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<DashMap<TypeId, Vec<Arc<dyn DynEventHandler>>>>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
        }
    }

    /// Subscribe a handler to an event type.
    pub fn subscribe<E, H>(&self, handler: H)
    where
        E: Event,
        H: DynEventHandler + 'static,
    {
        let type_id = TypeId::of::<E>();
        self.handlers.entry(type_id).or_default().push(Arc::new(handler));
        debug!(event_type = std::any::type_name::<E>(), "subscribed event handler");
    }

    /// Publish a typed event.
    pub async fn publish<E: Event>(&self, event: &E) -> Result<(), EventBusError> {
        self.publish_dyn(event).await
    }

    /// Publish a type-erased event.
    ///
    /// Routing uses the concrete type behind the trait object, so enum-shaped
    /// domain events can be unwrapped once and dispatched without generics.
    pub async fn publish_dyn(&self, event: &dyn Event) -> Result<(), EventBusError> {
        let type_id = event.as_any().type_id();

        let handlers = match self.handlers.get(&type_id) {
            Some(handlers) => handlers.clone(),
            None => {
                debug!(event = event.event_name(), "no subscribers registered");
                return Ok(());
            }
        };

        debug!(
            event = event.event_name(),
            event_id = %event.event_id(),
            subscribers = handlers.len(),
            "publishing event"
        );

        let mut failures = Vec::new();
        for handler in handlers.iter() {
            if let Err(e) = handler.handle_dyn(event).await {
                error!(event = event.event_name(), error = %e, "event subscriber failed");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EventBusError::HandlersFailed(failures))
        }
    }

    /// Number of subscribers for an event type.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<E>())
            .map(|h| h.len())
            .unwrap_or(0)
    }

    /// Drop every subscriber for an event type.
    pub fn unsubscribe_all<E: Event>(&self) {
        self.handlers.remove(&TypeId::of::<E>());
    }
}

/// Event bus errors.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("{} event subscriber(s) failed", .0.len())]
    HandlersFailed(Vec<EventHandlerError>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventHandler, TypedEventHandler};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::any::Any;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    struct Pinged {
        id: Uuid,
        at: DateTime<Utc>,
    }

    impl Pinged {
        fn now() -> Self {
            Self {
                id: Uuid::new_v4(),
                at: Utc::now(),
            }
        }
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

    #[derive(Clone)]
    struct Recorder {
        label: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler<Pinged> for Recorder {
        async fn handle(&self, _event: &Pinged) -> Result<(), EventHandlerError> {
            self.order.lock().unwrap().push(self.label);
            if self.fail {
                Err(EventHandlerError::HandlerFailed("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Clone)]
    struct Counter {
        hits: Arc<AtomicU32>,
    }

    #[async_trait]
    impl EventHandler<Pinged> for Counter {
        async fn handle(&self, _event: &Pinged) -> Result<(), EventHandlerError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));

        bus.subscribe::<Pinged, _>(TypedEventHandler::new(Counter { hits: hits.clone() }));
        bus.subscribe::<Pinged, _>(TypedEventHandler::new(Counter { hits: hits.clone() }));

        bus.publish(&Pinged::now()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_registration_order_is_preserved() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            bus.subscribe::<Pinged, _>(TypedEventHandler::new(Recorder {
                label,
                order: order.clone(),
                fail: false,
            }));
        }

        bus.publish(&Pinged::now()).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_subscribers() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe::<Pinged, _>(TypedEventHandler::new(Recorder {
            label: "failing",
            order: order.clone(),
            fail: true,
        }));
        bus.subscribe::<Pinged, _>(TypedEventHandler::new(Recorder {
            label: "after",
            order: order.clone(),
            fail: false,
        }));

        let result = bus.publish(&Pinged::now()).await;

        assert!(matches!(result, Err(EventBusError::HandlersFailed(ref f)) if f.len() == 1));
        assert_eq!(*order.lock().unwrap(), vec!["failing", "after"]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        assert!(bus.publish(&Pinged::now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count::<Pinged>(), 0);

        bus.subscribe::<Pinged, _>(TypedEventHandler::new(Counter {
            hits: Arc::new(AtomicU32::new(0)),
        }));
        assert_eq!(bus.subscriber_count::<Pinged>(), 1);

        bus.unsubscribe_all::<Pinged>();
        assert_eq!(bus.subscriber_count::<Pinged>(), 0);
    }
}
