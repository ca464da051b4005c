use common::MessageId;
use thiserror::Error;

/// Errors that can occur when interacting with the message bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The topic has been closed and no longer accepts publications.
    #[error("topic '{0}' is closed")]
    TopicClosed(String),

    /// A payload could not be serialized into or out of an envelope.
    #[error("envelope codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// An ack/nack referred to a message that is not currently in flight.
    #[error("message {0} is not in flight")]
    NotInFlight(MessageId),
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
