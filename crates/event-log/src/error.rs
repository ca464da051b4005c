use thiserror::Error;

/// Errors that can occur when interacting with the event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// A writer tried to append outside its permitted key-prefix namespace.
    #[error("record key '{key}' is outside the permitted namespace '{namespace}'")]
    KeyOutsideNamespace { key: String, namespace: String },

    /// The delivery's payload could not be decoded as an order event.
    #[error("malformed event payload: {0}")]
    Payload(#[from] event_bus::BusError),

    /// A customer query was issued without an email.
    #[error("email is required")]
    MissingEmail,

    /// The log's persistence layer failed.
    #[error("event log unavailable: {0}")]
    Unavailable(String),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;
