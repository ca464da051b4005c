use thiserror::Error;

/// Errors that can occur while processing a notification.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The outbound email side effect failed.
    #[error("email delivery failed: {0}")]
    Email(String),

    /// The delivery's payload could not be decoded as an order event.
    #[error("malformed event payload: {0}")]
    Payload(#[from] event_bus::BusError),
}
