//! In-process domain event dispatch for Kudi.
//!
//! The bus routes a published event to every subscriber registered for its
//! concrete type, sequentially and in registration order, on the publishing
//! task. Subscriber failures are collected and reported to the caller, which
//! decides what they mean: the command pipeline logs and drops them (the
//! event is already durable in the outbox), while the outbox relay turns
//! them into a retry.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventBusError};
pub use event::{DynEventHandler, Event, EventHandler, EventHandlerError, TypedEventHandler};
