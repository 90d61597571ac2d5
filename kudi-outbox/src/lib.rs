//! Transactional outbox for Kudi domain events.
//!
//! Events are written to the `outbox_messages` table inside the same
//! database transaction as the state change that produced them, then a
//! single background relay drains pending rows and republishes them on the
//! in-process bus. Delivery is at-least-once: subscribers must be
//! idempotent. Rows that exhaust their retries stay in the table as a
//! dead-letter set until an operator resets them.

pub mod codec;
pub mod error;
pub mod message;
pub mod relay;
pub mod sink;
pub mod store;

pub use error::{OutboxError, OutboxResult};
pub use message::OutboxMessage;
pub use relay::{OutboxRelay, RelayConfig};
pub use sink::EventSink;
pub use store::OutboxStore;
