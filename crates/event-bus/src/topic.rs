//! Topic router: attribute-filtered fan-out to push-direct and queued
//! subscribers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::MessageId;
use thiserror::Error;

use crate::queue::WorkQueue;
use crate::{BusError, Envelope, Result};

/// Acknowledgement that a broadcast was accepted by the router.
///
/// Acceptance does not imply that any subscriber has processed the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// The message ID assigned to this publication. All deliveries fanned
    /// out from it carry the same ID.
    pub message_id: MessageId,
}

/// A single delivery of a published envelope to one subscriber.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Publication-level message ID, shared across all subscribers.
    pub message_id: MessageId,

    /// The published envelope.
    pub envelope: Envelope,
}

/// Error returned by a push-direct subscriber that failed to process a
/// delivery. Failure of one subscriber never blocks delivery to the others.
#[derive(Debug, Error)]
#[error("subscriber error: {message}")]
pub struct SubscriberError {
    pub message: String,
}

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BusError> for SubscriberError {
    fn from(err: BusError) -> Self {
        Self::new(err.to_string())
    }
}

/// A subscriber invoked synchronously by the router per matching envelope.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Name used in logs when a delivery to this subscriber fails.
    fn name(&self) -> &str;

    /// Handles one delivery. Deliveries may repeat; handlers must be
    /// idempotent with respect to `delivery.message_id`.
    async fn handle(&self, delivery: &Delivery) -> std::result::Result<(), SubscriberError>;
}

/// Pure predicate over the envelope's event-type attribute.
///
/// A subscription with no filter receives every envelope; with a filter it
/// receives only envelopes whose event type is in the allowlist.
#[derive(Debug, Clone)]
pub struct EventFilter {
    allowed: HashSet<String>,
}

impl EventFilter {
    /// Builds a filter that admits only the listed event types.
    pub fn allowlist<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: event_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the given event type passes the filter.
    pub fn matches(&self, event_type: &str) -> bool {
        self.allowed.contains(event_type)
    }
}

#[derive(Clone)]
enum DeliveryMode {
    /// Router invokes the subscriber inline, per envelope.
    PushDirect(Arc<dyn Subscriber>),

    /// Router enqueues the envelope; a consumer pulls it later.
    Queued(WorkQueue),
}

/// A registered subscription: optional filter plus a delivery mode.
#[derive(Clone)]
pub struct Subscription {
    filter: Option<EventFilter>,
    mode: DeliveryMode,
}

impl Subscription {
    /// Subscription that invokes the subscriber synchronously per envelope.
    pub fn push(subscriber: Arc<dyn Subscriber>) -> Self {
        Self {
            filter: None,
            mode: DeliveryMode::PushDirect(subscriber),
        }
    }

    /// Subscription that enqueues matching envelopes onto a work queue.
    pub fn queued(queue: WorkQueue) -> Self {
        Self {
            filter: None,
            mode: DeliveryMode::Queued(queue),
        }
    }

    /// Restricts the subscription to the filter's allowlist.
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    fn accepts(&self, event_type: &str) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(event_type))
    }
}

struct TopicInner {
    name: String,
    subscriptions: RwLock<Vec<Subscription>>,
    closed: AtomicBool,
}

/// An in-process broadcast topic.
///
/// `publish` fans each envelope out to every subscription whose filter
/// matches. Push-direct subscribers run inline and their failures are
/// logged, never propagated; queued subscriptions enqueue and return
/// immediately. Cloning a `Topic` yields another handle to the same router.
#[derive(Clone)]
pub struct Topic {
    inner: Arc<TopicInner>,
}

impl Topic {
    /// Creates a new topic with no subscriptions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TopicInner {
                name: name.into(),
                subscriptions: RwLock::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the topic name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registers a subscription.
    pub fn subscribe(&self, subscription: Subscription) {
        self.inner
            .subscriptions
            .write()
            .unwrap()
            .push(subscription);
    }

    /// Returns the number of registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.read().unwrap().len()
    }

    /// Stops accepting publications. Used to simulate a router outage.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    /// Broadcasts an envelope to all matching subscriptions.
    ///
    /// Returns a receipt once the router has accepted the publication.
    /// Fan-out is independent per subscriber: a failing push-direct
    /// subscriber does not prevent delivery to the rest.
    #[tracing::instrument(skip(self, envelope), fields(topic = %self.inner.name, event_type = %envelope.event_type))]
    pub async fn publish(&self, envelope: Envelope) -> Result<DeliveryReceipt> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(BusError::TopicClosed(self.inner.name.clone()));
        }

        let message_id = MessageId::new();
        let delivery = Delivery {
            message_id,
            envelope,
        };

        // Snapshot under the lock, dispatch outside it.
        let subscriptions: Vec<Subscription> =
            self.inner.subscriptions.read().unwrap().clone();

        for subscription in &subscriptions {
            if !subscription.accepts(&delivery.envelope.event_type) {
                continue;
            }

            match &subscription.mode {
                DeliveryMode::PushDirect(subscriber) => {
                    if let Err(err) = subscriber.handle(&delivery).await {
                        metrics::counter!("bus_push_deliveries_failed").increment(1);
                        tracing::warn!(
                            subscriber = subscriber.name(),
                            message_id = %message_id,
                            error = %err,
                            "push-direct delivery failed"
                        );
                    }
                }
                DeliveryMode::Queued(queue) => {
                    queue.send(delivery.clone());
                }
            }
        }

        metrics::counter!("bus_envelopes_published").increment(1);
        Ok(DeliveryReceipt { message_id })
    }
}
