//! Idempotent, self-expiring persistence for audit records.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::record::OrderEventRecord;
use crate::{EventLogError, Result};

/// Key-prefix namespace this pipeline's writer is permitted to append under.
pub const ORDER_KEY_NAMESPACE: &str = "order#";

/// Append-only store for order event records.
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Unconditional put keyed `(partition_key, sort_key)`.
    ///
    /// A later record with the same key silently overwrites the earlier
    /// one. The partition key must fall inside the writer's permitted
    /// namespace; anything else is rejected before touching storage.
    async fn append(&self, record: OrderEventRecord) -> Result<()>;

    /// All live records for a customer whose sort key starts with the given
    /// prefix, in sort-key order (chronological, since the key embeds the
    /// timestamp). Expired records are never returned.
    async fn query_by_customer(
        &self,
        email: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<OrderEventRecord>>;
}

/// In-memory event log store.
///
/// Expiry is enforced at query time; appends also purge opportunistically
/// to bound memory.
#[derive(Clone)]
pub struct InMemoryEventLogStore {
    permitted_namespace: String,
    records: Arc<RwLock<BTreeMap<(String, String), OrderEventRecord>>>,
}

impl Default for InMemoryEventLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventLogStore {
    /// Creates a store permitting writes under [`ORDER_KEY_NAMESPACE`].
    pub fn new() -> Self {
        Self::with_permitted_namespace(ORDER_KEY_NAMESPACE)
    }

    /// Creates a store with an explicit permitted key-prefix namespace.
    pub fn with_permitted_namespace(namespace: impl Into<String>) -> Self {
        Self {
            permitted_namespace: namespace.into(),
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of records currently held, including expired ones not yet
    /// purged.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl EventLogStore for InMemoryEventLogStore {
    async fn append(&self, record: OrderEventRecord) -> Result<()> {
        if !record.partition_key.starts_with(&self.permitted_namespace) {
            return Err(EventLogError::KeyOutsideNamespace {
                key: record.partition_key,
                namespace: self.permitted_namespace.clone(),
            });
        }

        let now = Utc::now();
        let mut records = self.records.write().await;
        records.retain(|_, r| !r.is_expired(now));
        records.insert(
            (record.partition_key.clone(), record.sort_key.clone()),
            record,
        );
        metrics::counter!("event_log_records_appended").increment(1);
        Ok(())
    }

    async fn query_by_customer(
        &self,
        email: &str,
        sort_key_prefix: &str,
    ) -> Result<Vec<OrderEventRecord>> {
        let now = Utc::now();
        let records = self.records.read().await;

        let mut matching: Vec<OrderEventRecord> = records
            .values()
            .filter(|r| {
                r.email == email && r.sort_key.starts_with(sort_key_prefix) && !r.is_expired(now)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use common::{MessageId, OrderId, RequestId};

    use crate::record::{OrderEventInfo, RETENTION_SECONDS};

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

    #[tokio::test]
    async fn append_then_query_by_customer() {
        let store = InMemoryEventLogStore::new();
        let now = Utc::now();
        store.append(record("a@b.com", "ORDER_CREATED", now)).await.unwrap();
        store.append(record("c@d.com", "ORDER_CREATED", now)).await.unwrap();

        let records = store.query_by_customer("a@b.com", "ORDER_").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "a@b.com");
    }

    #[tokio::test]
    async fn same_key_silently_overwrites() {
        let store = InMemoryEventLogStore::new();
        let now = Utc::now();
        let first = record("a@b.com", "ORDER_CREATED", now);
        let mut second = first.clone();
        second.info.source_message_id = MessageId::new();

        store.append(first).await.unwrap();
        store.append(second.clone()).await.unwrap();

        let records = store.query_by_customer("a@b.com", "ORDER_").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].info.source_message_id,
            second.info.source_message_id
        );
    }

    #[tokio::test]
    async fn prefix_narrows_to_event_type() {
        let store = InMemoryEventLogStore::new();
        let now = Utc::now();
        store.append(record("a@b.com", "ORDER_CREATED", now)).await.unwrap();
        store
            .append(record("a@b.com", "ORDER_DELETED", now + Duration::seconds(1)))
            .await
            .unwrap();

        let created = store
            .query_by_customer("a@b.com", "ORDER_CREATED")
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].event_type, "ORDER_CREATED");

        let all = store.query_by_customer("a@b.com", "ORDER_").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn results_are_chronological() {
        let store = InMemoryEventLogStore::new();
        let now = Utc::now();
        let later = record("a@b.com", "ORDER_DELETED", now + Duration::seconds(2));
        let earlier = record("a@b.com", "ORDER_CREATED", now);
        store.append(later).await.unwrap();
        store.append(earlier).await.unwrap();

        let records = store.query_by_customer("a@b.com", "ORDER_").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].created_at < records[1].created_at);
    }

    #[tokio::test]
    async fn expired_records_are_excluded_from_queries() {
        let store = InMemoryEventLogStore::new();
        let stale = Utc::now() - Duration::seconds(RETENTION_SECONDS + 1);
        store.append(record("a@b.com", "ORDER_CREATED", stale)).await.unwrap();

        let records = store.query_by_customer("a@b.com", "ORDER_").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn append_purges_expired_records() {
        let store = InMemoryEventLogStore::new();
        let stale = Utc::now() - Duration::seconds(RETENTION_SECONDS + 1);
        store.append(record("a@b.com", "ORDER_CREATED", stale)).await.unwrap();
        assert_eq!(store.record_count().await, 1);

        store
            .append(record("a@b.com", "ORDER_CREATED", Utc::now()))
            .await
            .unwrap();
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn append_outside_namespace_is_rejected() {
        let store = InMemoryEventLogStore::new();
        let mut rogue = record("a@b.com", "ORDER_CREATED", Utc::now());
        rogue.partition_key = "product#123".to_string();

        let result = store.append(rogue).await;
        assert!(matches!(
            result,
            Err(EventLogError::KeyOutsideNamespace { .. })
        ));
        assert_eq!(store.record_count().await, 0);
    }
}
