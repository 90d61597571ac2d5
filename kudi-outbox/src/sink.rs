//! Outbound event sink interface.

use crate::error::OutboxResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// External publisher for relayed events (message broker, webhook fan-out).
///
/// The relay currently delivers to in-process subscribers only; this trait
/// is the seam a broker-backed delivery plugs into.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(
        &self,
        event_type: &str,
        payload: &Value,
        occurred_on: DateTime<Utc>,
    ) -> OutboxResult<()>;
}
