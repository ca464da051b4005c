use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Transport wrapper pairing an event-type tag with an opaque serialized
/// payload.
///
/// The bus routes on `event_type` alone; `data` is a JSON-encoded domain
/// event that only consumers declaring knowledge of that event type should
/// decode. Envelopes are immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The event-type tag used for subscription filtering.
    #[serde(rename = "eventType")]
    pub event_type: String,

    /// JSON-encoded domain event.
    pub data: String,
}

impl Envelope {
    /// Wraps a payload into an envelope, serializing it to JSON.
    pub fn wrap<T: Serialize>(event_type: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self {
            event_type: event_type.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Decodes the payload as the given type.
    ///
    /// Consumers must not assume payload shape beyond what `event_type`
    /// declares.
    pub fn open<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        seq: u32,
        note: String,
    }

    #[test]
    fn wrap_and_open() {
        let payload = Ping {
            seq: 7,
            note: "hello".to_string(),
        };
        let envelope = Envelope::wrap("PING", &payload).unwrap();
        assert_eq!(envelope.event_type, "PING");

        let decoded: Ping = envelope.open().unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn wire_shape_uses_event_type_key() {
        let envelope = Envelope::wrap("ORDER_CREATED", &serde_json::json!({"x": 1})).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["eventType"], "ORDER_CREATED");
        assert!(json["data"].is_string());
    }

    #[test]
    fn open_rejects_mismatched_payload() {
        let envelope = Envelope::wrap("PING", &serde_json::json!({"seq": "not-a-number"})).unwrap();
        let result: Result<Ping> = envelope.open();
        assert!(result.is_err());
    }
}
