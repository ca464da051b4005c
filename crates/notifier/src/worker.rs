//! Batch consumer driving email notifications off the order events queue.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use common::MessageId;
use event_bus::{QueueMessage, WorkQueue};
use orders::OrderEvent;

use crate::email::EmailSender;
use crate::error::NotifierError;

/// Maximum messages pulled per batch.
pub const BATCH_SIZE: usize = 5;

/// Bounded wait window to accumulate a batch before processing. Favors
/// fewer, fuller batches over low latency.
pub const BATCH_WINDOW: Duration = Duration::from_secs(5);

/// Pull-based consumer for the email notification path.
///
/// Each message moves `Received -> Processing -> {Acknowledged | Retried |
/// DeadLettered}`: a successful send acks, a failed send nacks and the queue
/// decides between redelivery and the dead-letter sink. Processing is
/// idempotent per message identity: the side-effect log is the set of
/// processed message IDs, so a redelivered message acks without sending a
/// second email.
pub struct EmailWorker<E> {
    queue: WorkQueue,
    sender: E,
    processed: Mutex<HashSet<MessageId>>,
}

impl<E: EmailSender> EmailWorker<E> {
    /// Creates a worker pulling from the given queue.
    pub fn new(queue: WorkQueue, sender: E) -> Self {
        Self {
            queue,
            sender,
            processed: Mutex::new(HashSet::new()),
        }
    }

    /// Consumes batches forever. Intended to be driven from a spawned task.
    pub async fn run(&self) {
        loop {
            self.run_once(BATCH_SIZE, BATCH_WINDOW).await;
        }
    }

    /// Pulls one batch and processes it. Returns the number of messages
    /// handled, which may be zero if the window elapsed empty.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self, max: usize, wait: Duration) -> usize {
        let batch = self.queue.receive(max, wait).await;
        let handled = batch.len();

        for message in batch {
            self.process(message).await;
        }

        handled
    }

    async fn process(&self, message: QueueMessage) {
        let message_id = message.message_id;

        if self.processed.lock().unwrap().contains(&message_id) {
            tracing::debug!(%message_id, "redelivery of an already processed message, acking");
            self.finish(message_id, Outcome::Ack);
            return;
        }

        match self.notify(&message).await {
            Ok(()) => {
                self.processed.lock().unwrap().insert(message_id);
                metrics::counter!("order_emails_sent").increment(1);
                self.finish(message_id, Outcome::Ack);
            }
            Err(err) => {
                metrics::counter!("order_emails_failed").increment(1);
                tracing::warn!(
                    %message_id,
                    receive_count = message.receive_count,
                    error = %err,
                    "notification failed, message will be retried or dead-lettered"
                );
                self.finish(message_id, Outcome::Nack);
            }
        }
    }

    async fn notify(&self, message: &QueueMessage) -> Result<(), NotifierError> {
        let event: OrderEvent = message.envelope.open()?;
        let body = format!(
            "Received order {} with total amount of {}",
            event.order_id,
            event.billing.total_price
        );

        self.sender
            .send(&event.email, "Order Received", &body)
            .await
    }

    fn finish(&self, message_id: MessageId, outcome: Outcome) {
        let result = match outcome {
            Outcome::Ack => self.queue.ack(message_id),
            Outcome::Nack => self.queue.nack(message_id),
        };
        if let Err(err) = result {
            tracing::error!(%message_id, error = %err, "queue settlement failed");
        }
    }
}

enum Outcome {
    Ack,
    Nack,
}
