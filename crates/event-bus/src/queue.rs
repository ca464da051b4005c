//! Durable work queue with batch receive, redelivery, and dead-lettering.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::MessageId;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::topic::Delivery;
use crate::{BusError, Envelope, Result};

/// A message pulled from a [`WorkQueue`].
///
/// `receive_count` is the number of times this message has been handed to a
/// consumer, including the current delivery.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Publication-level message ID, stable across redeliveries.
    pub message_id: MessageId,

    /// The enqueued envelope.
    pub envelope: Envelope,

    /// How many times the message has been received.
    pub receive_count: u32,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueueMessage>,
    in_flight: HashMap<MessageId, QueueMessage>,
    dead: Vec<QueueMessage>,
}

struct QueueInner {
    name: String,
    max_receive_count: u32,
    state: Mutex<QueueState>,
    arrival: Notify,
}

/// At-least-once work queue consumed in batches.
///
/// Messages move `pending -> in_flight` on receive. `ack` completes a
/// message; `nack` returns it to the tail of the queue for redelivery, or
/// moves it to the dead-letter sink once it has been received
/// `max_receive_count` times. A message that is never acked or nacked stays
/// parked in flight; the consumer contract is ack-or-nack per received
/// message.
///
/// Cloning a `WorkQueue` yields another handle to the same queue.
#[derive(Clone)]
pub struct WorkQueue {
    inner: Arc<QueueInner>,
}

impl WorkQueue {
    /// Creates a queue that dead-letters messages after `max_receive_count`
    /// unsuccessful deliveries.
    pub fn new(name: impl Into<String>, max_receive_count: u32) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                name: name.into(),
                max_receive_count,
                state: Mutex::new(QueueState::default()),
                arrival: Notify::new(),
            }),
        }
    }

    /// Returns the queue name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the delivery ceiling before dead-lettering.
    pub fn max_receive_count(&self) -> u32 {
        self.inner.max_receive_count
    }

    /// Enqueues a delivery.
    pub fn send(&self, delivery: Delivery) {
        let message = QueueMessage {
            message_id: delivery.message_id,
            envelope: delivery.envelope,
            receive_count: 0,
        };

        self.inner.state.lock().unwrap().pending.push_back(message);
        metrics::counter!("queue_messages_enqueued").increment(1);
        self.inner.arrival.notify_one();
    }

    /// Pulls up to `max` messages, waiting at most `wait` to accumulate a
    /// batch.
    ///
    /// Returns as soon as the batch is full; otherwise returns whatever
    /// arrived within the window, possibly nothing. Received messages are
    /// in flight until acked or nacked.
    pub async fn receive(&self, max: usize, wait: Duration) -> Vec<QueueMessage> {
        let deadline = Instant::now() + wait;
        let mut batch = Vec::new();

        loop {
            {
                let mut state = self.inner.state.lock().unwrap();
                while batch.len() < max {
                    let Some(mut message) = state.pending.pop_front() else {
                        break;
                    };
                    message.receive_count += 1;
                    state.in_flight.insert(message.message_id, message.clone());
                    batch.push(message);
                }
            }

            if batch.len() >= max {
                return batch;
            }

            let now = Instant::now();
            if now >= deadline {
                return batch;
            }

            // A send between the drain above and this await leaves a stored
            // permit, so no arrival is lost.
            let _ = tokio::time::timeout(deadline - now, self.inner.arrival.notified()).await;
        }
    }

    /// Completes an in-flight message.
    pub fn ack(&self, message_id: MessageId) -> Result<()> {
        let mut state = self.inner.state.lock().unwrap();
        state
            .in_flight
            .remove(&message_id)
            .map(|_| ())
            .ok_or(BusError::NotInFlight(message_id))
    }

    /// Fails an in-flight message.
    ///
    /// The message re-enters the tail of the queue, or moves to the
    /// dead-letter sink once its receive count has reached the ceiling.
    /// Redelivery order is therefore not preserved relative to newer
    /// messages.
    pub fn nack(&self, message_id: MessageId) -> Result<()> {
        let mut state = self.inner.state.lock().unwrap();
        let message = state
            .in_flight
            .remove(&message_id)
            .ok_or(BusError::NotInFlight(message_id))?;

        if message.receive_count >= self.inner.max_receive_count {
            tracing::warn!(
                queue = %self.inner.name,
                message_id = %message_id,
                receive_count = message.receive_count,
                event_type = %message.envelope.event_type,
                "message exhausted its delivery ceiling, moving to dead-letter sink"
            );
            metrics::counter!("queue_messages_dead_lettered").increment(1);
            state.dead.push(message);
        } else {
            state.pending.push_back(message);
            drop(state);
            self.inner.arrival.notify_one();
        }

        Ok(())
    }

    /// Number of messages waiting to be received.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().unwrap().pending.len()
    }

    /// Number of messages received but not yet acked or nacked.
    pub fn in_flight_count(&self) -> usize {
        self.inner.state.lock().unwrap().in_flight.len()
    }

    /// Snapshot of the dead-letter sink, for inspection.
    pub fn dead_letters(&self) -> Vec<QueueMessage> {
        self.inner.state.lock().unwrap().dead.clone()
    }
}

impl WorkQueue {
    #[cfg(test)]
    fn send_test_envelope(&self, event_type: &str) -> MessageId {
        let message_id = MessageId::new();
        self.send(Delivery {
            message_id,
            envelope: Envelope::wrap(event_type, &serde_json::json!({"n": 1})).unwrap(),
        });
        message_id
    }
}
