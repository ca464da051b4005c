//! The durable audit record written for each delivered order event.

use chrono::{DateTime, Duration, Utc};
use common::{MessageId, OrderId, RequestId};
use event_bus::Delivery;
use orders::OrderEvent;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Retention window for audit records. Records older than this are treated
/// as expired and never returned from queries: the log is a near-real-time
/// audit aid, not durable history.
pub const RETENTION_SECONDS: i64 = 5 * 60;

/// Nested payload details of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEventInfo {
    pub order_id: OrderId,
    pub product_codes: Vec<String>,
    /// The bus message ID of the delivery that produced this record.
    pub source_message_id: MessageId,
}

/// One audit entry per delivered order event.
///
/// Keyed by `(partition_key, sort_key)` where the partition key namespaces
/// the order and the sort key embeds the event type and a millisecond
/// timestamp. A redelivery that reuses the same timestamp lands on the same
/// key and silently overwrites; acceptable for a best-effort audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEventRecord {
    #[serde(rename = "pk")]
    pub partition_key: String,

    #[serde(rename = "sk")]
    pub sort_key: String,

    /// When the record expires.
    #[serde(rename = "ttl")]
    pub expires_at: DateTime<Utc>,

    /// Customer email; the secondary query key.
    pub email: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "requestId")]
    pub request_id: RequestId,

    #[serde(rename = "eventType")]
    pub event_type: String,

    pub info: OrderEventInfo,
}

impl OrderEventRecord {
    /// Builds a record from a bus delivery, stamped with the current time.
    pub fn from_delivery(delivery: &Delivery) -> Result<Self> {
        Self::from_delivery_at(delivery, Utc::now())
    }

    /// Builds a record from a bus delivery with an explicit creation time.
    pub fn from_delivery_at(delivery: &Delivery, created_at: DateTime<Utc>) -> Result<Self> {
        let event: OrderEvent = delivery.envelope.open()?;
        let event_type = delivery.envelope.event_type.clone();

        Ok(Self {
            partition_key: Self::partition_key_for(event.order_id),
            sort_key: Self::sort_key_for(&event_type, created_at),
            expires_at: created_at + Duration::seconds(RETENTION_SECONDS),
            email: event.email,
            created_at,
            request_id: event.request_id,
            event_type,
            info: OrderEventInfo {
                order_id: event.order_id,
                product_codes: event.product_codes,
                source_message_id: delivery.message_id,
            },
        })
    }

    /// Partition key for an order: `order#<orderId>`.
    pub fn partition_key_for(order_id: OrderId) -> String {
        format!("order#{order_id}")
    }

    /// Sort key for an event occurrence: `<EVENT_TYPE>#<millis>`.
    pub fn sort_key_for(event_type: &str, at: DateTime<Utc>) -> String {
        format!("{event_type}#{}", at.timestamp_millis())
    }

    /// Returns true once the retention window has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
