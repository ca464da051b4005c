//! Read-only query surface over the event log.

use chrono::{DateTime, Utc};
use common::{OrderId, RequestId};
use serde::{Deserialize, Serialize};

use crate::store::EventLogStore;
use crate::{EventLogError, Result};

/// Default sort-key prefix: order lifecycle events only. The log's key
/// namespace is shared with product events, which this surface never
/// returns unless explicitly asked for by prefix.
const DEFAULT_PREFIX: &str = "ORDER_";

/// Projection of an audit record returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEventSummary {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub event_type: String,
    pub request_id: RequestId,
    pub order_id: OrderId,
    pub product_codes: Vec<String>,
}

/// Thin read service answering "events for customer X, of type Y".
pub struct EventQueryService<S> {
    store: S,
}

impl<S: EventLogStore> EventQueryService<S> {
    /// Creates a query service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns event summaries for a customer, optionally narrowed by an
    /// event-type prefix.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_customer(
        &self,
        email: &str,
        event_type: Option<&str>,
    ) -> Result<Vec<OrderEventSummary>> {
        if email.trim().is_empty() {
            return Err(EventLogError::MissingEmail);
        }

        let prefix = event_type.unwrap_or(DEFAULT_PREFIX);
        let records = self.store.query_by_customer(email, prefix).await?;

        Ok(records
            .into_iter()
            .map(|r| OrderEventSummary {
                email: r.email,
                created_at: r.created_at,
                event_type: r.event_type,
                request_id: r.request_id,
                order_id: r.info.order_id,
                product_codes: r.info.product_codes,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::MessageId;

    use crate::record::{OrderEventInfo, OrderEventRecord, RETENTION_SECONDS};
    use crate::store::InMemoryEventLogStore;

    fn record(email: &str, event_type: &str, created_at: DateTime<Utc>) -> OrderEventRecord {
        let order_id = OrderId::new();
        OrderEventRecord {
            partition_key: OrderEventRecord::partition_key_for(order_id),
            sort_key: OrderEventRecord::sort_key_for(event_type, created_at),
            expires_at: created_at + Duration::seconds(RETENTION_SECONDS),
            email: email.to_string(),
            created_at,
            request_id: RequestId::new(),
            event_type: event_type.to_string(),
            info: OrderEventInfo {
                order_id,
                product_codes: vec!["P1".to_string()],
                source_message_id: MessageId::new(),
            },
        }
    }

    async fn seeded_service() -> EventQueryService<InMemoryEventLogStore> {
        let store = InMemoryEventLogStore::new();
        let now = Utc::now();
        store.append(record("a@b.com", "ORDER_CREATED", now)).await.unwrap();
        store
            .append(record("a@b.com", "ORDER_DELETED", now + Duration::seconds(1)))
            .await
            .unwrap();
        store
            .append(record("a@b.com", "PRODUCT_UPDATED", now + Duration::seconds(2)))
            .await
            .unwrap();
        EventQueryService::new(store)
    }

    #[tokio::test]
    async fn defaults_to_order_events_only() {
        let service = seeded_service().await;

        let summaries = service.get_by_customer("a@b.com", None).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.event_type.starts_with("ORDER_")));
    }

    #[tokio::test]
    async fn explicit_type_narrows_results() {
        let service = seeded_service().await;

        let summaries = service
            .get_by_customer("a@b.com", Some("ORDER_DELETED"))
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].event_type, "ORDER_DELETED");
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let service = seeded_service().await;

        let result = service.get_by_customer("", None).await;
        assert!(matches!(result, Err(EventLogError::MissingEmail)));
    }

    #[tokio::test]
    async fn unknown_customer_yields_empty_list() {
        let service = seeded_service().await;

        let summaries = service.get_by_customer("nobody@b.com", None).await.unwrap();
        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn summary_wire_shape() {
        let service = seeded_service().await;

        let summaries = service.get_by_customer("a@b.com", None).await.unwrap();
        let json = serde_json::to_value(&summaries[0]).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("eventType").is_some());
        assert!(json.get("requestId").is_some());
        assert!(json.get("orderId").is_some());
        assert!(json.get("productCodes").is_some());
    }
}
