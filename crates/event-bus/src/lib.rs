pub mod envelope;
pub mod error;
pub mod queue;
pub mod topic;

pub use common::MessageId;
pub use envelope::Envelope;
pub use error::{BusError, Result};
pub use queue::{QueueMessage, WorkQueue};
pub use topic::{
    Delivery, DeliveryReceipt, EventFilter, Subscriber, SubscriberError, Subscription, Topic,
};
