//! Order event publication onto the topic router.

use std::time::Duration;

use event_bus::{BusError, DeliveryReceipt, Envelope, Topic};
use thiserror::Error;

use crate::events::{EventType, OrderEvent};

/// Default ceiling on how long a publication may block the command handler.
const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from publishing an order event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The bus rejected or could not encode the publication.
    #[error("event bus error: {0}")]
    Bus(#[from] BusError),

    /// The router did not accept the publication within the timeout.
    #[error("publication timed out after {0:?}")]
    Timeout(Duration),
}

/// Wraps order events in envelopes and broadcasts them.
///
/// Publication is fire-and-forget from the command handler's perspective:
/// the handler observes acceptance or failure of the broadcast, never
/// subscriber completion, and a failure must not abort the already
/// committed order write.
#[derive(Clone)]
pub struct OrderEventPublisher {
    topic: Topic,
    timeout: Duration,
}

impl OrderEventPublisher {
    /// Creates a publisher onto the given topic with the default timeout.
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Overrides the publication timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wraps the event and broadcasts it under the given type tag.
    #[tracing::instrument(skip(self, event), fields(event_type = %event_type, order_id = %event.order_id))]
    pub async fn publish(
        &self,
        event_type: EventType,
        event: &OrderEvent,
    ) -> Result<DeliveryReceipt, PublishError> {
        let envelope = Envelope::wrap(event_type.as_str(), event).map_err(PublishError::Bus)?;

        let receipt = tokio::time::timeout(self.timeout, self.topic.publish(envelope))
            .await
            .map_err(|_| PublishError::Timeout(self.timeout))??;

        metrics::counter!("order_events_published").increment(1);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::RequestId;
    use event_bus::{Subscription, WorkQueue};

    use crate::catalog::Product;
    use crate::order::Order;
    use crate::value_objects::{Carrier, Money, PaymentMethod, ShippingSelection, ShippingType};

    fn sample_event() -> OrderEvent {
        let order = Order::build(
            "a@b.com",
            &[Product {
                id: "1".to_string(),
                code: "P1".to_string(),
                name: "Widget".to_string(),
                price: Money::from_cents(1000),
                model: "2026".to_string(),
            }],
            PaymentMethod::Cash,
            ShippingSelection {
                kind: ShippingType::Economic,
                carrier: Carrier::Ups,
            },
        );
        OrderEvent::from_order(&order, RequestId::new())
    }

    #[tokio::test]
    async fn publishes_wrapped_event_to_topic() {
        let topic = Topic::new("order-events");
        let queue = WorkQueue::new("order-events-queue", 3);
        topic.subscribe(Subscription::queued(queue.clone()));

        let publisher = OrderEventPublisher::new(topic);
        let event = sample_event();
        publisher
            .publish(EventType::OrderCreated, &event)
            .await
            .unwrap();

        let batch = queue.receive(1, Duration::ZERO).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].envelope.event_type, "ORDER_CREATED");
        let decoded: OrderEvent = batch[0].envelope.open().unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn closed_topic_surfaces_bus_error() {
        let topic = Topic::new("order-events");
        topic.close();

        let publisher = OrderEventPublisher::new(topic);
        let result = publisher
            .publish(EventType::OrderCreated, &sample_event())
            .await;

        assert!(matches!(result, Err(PublishError::Bus(_))));
    }
}
