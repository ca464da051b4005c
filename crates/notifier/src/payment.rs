//! Push-direct payment notifier.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use event_bus::{Delivery, Subscriber, SubscriberError};

/// Payment-side consumer of `ORDER_CREATED` envelopes.
///
/// Payment processing itself lives outside this pipeline; this subscriber
/// logs each matching envelope and keeps a delivery counter so the fan-out
/// path is observable.
#[derive(Debug, Default)]
pub struct PaymentNotifier {
    received: AtomicU64,
}

impl PaymentNotifier {
    /// Creates a new payment notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of envelopes delivered so far.
    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Subscriber for PaymentNotifier {
    fn name(&self) -> &str {
        "payments"
    }

    async fn handle(&self, delivery: &Delivery) -> Result<(), SubscriberError> {
        self.received.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("payment_notifications_received").increment(1);
        tracing::info!(
            message_id = %delivery.message_id,
            event_type = %delivery.envelope.event_type,
            "order event received on payments path"
        );
        Ok(())
    }
}
