//! Push-direct subscriber that lands every order event in the audit log.

use async_trait::async_trait;
use event_bus::{Delivery, Subscriber, SubscriberError};

use crate::record::OrderEventRecord;
use crate::store::EventLogStore;

/// Audit-log sink: subscribes push-direct (no filter) and appends one
/// record per delivered envelope.
pub struct EventLogSink<S> {
    store: S,
}

impl<S: EventLogStore> EventLogSink<S> {
    /// Creates a sink writing into the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: EventLogStore> Subscriber for EventLogSink<S> {
    fn name(&self) -> &str {
        "order-events-log"
    }

    async fn handle(&self, delivery: &Delivery) -> Result<(), SubscriberError> {
        let record = OrderEventRecord::from_delivery(delivery)
            .map_err(|e| SubscriberError::new(e.to_string()))?;

        tracing::info!(
            message_id = %delivery.message_id,
            partition_key = %record.partition_key,
            "appending order event record"
        );

        self.store
            .append(record)
            .await
            .map_err(|e| SubscriberError::new(e.to_string()))
    }
}
