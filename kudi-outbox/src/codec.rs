//! Event serialization for outbox rows.
//!
//! The wire form is the tagged JSON of [`DomainEvent`]: a `type`
//! discriminator plus the variant's fields. Decoding resolves by the tag;
//! an unrecognized tag yields `None` so the relay can mark the row
//! processed instead of blocking the queue forever.

use kudi_domain::DomainEvent;
use serde_json::Value;

/// Serialize an event to its tagged JSON payload.
pub fn encode(event: &DomainEvent) -> Result<Value, serde_json::Error> {
    serde_json::to_value(event)
}

/// Deserialize a payload back into an event. `None` when the type tag is
/// unknown or the payload does not match the tagged shape.
pub fn decode(content: &Value) -> Option<DomainEvent> {
    serde_json::from_value(content.clone()).ok()
}
