//! Order lifecycle events and their wire shape.

use common::{OrderId, RequestId};
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::value_objects::{BillingSelection, ShippingSelection};

/// Event-type tags carried by envelopes on the order topic.
///
/// Product lifecycle tags are declared here because they share the envelope
/// addressing scheme and the audit-log sort-key namespace; this pipeline
/// only ever emits the order variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    OrderCreated,
    OrderDeleted,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
}

impl EventType {
    /// Returns the wire tag, e.g. `"ORDER_CREATED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "ORDER_CREATED",
            EventType::OrderDeleted => "ORDER_DELETED",
            EventType::ProductCreated => "PRODUCT_CREATED",
            EventType::ProductUpdated => "PRODUCT_UPDATED",
            EventType::ProductDeleted => "PRODUCT_DELETED",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain event emitted for order lifecycle transitions.
///
/// This is the envelope payload: the same shape is published for creation
/// and deletion, distinguished only by the envelope's event-type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    pub email: String,
    pub order_id: OrderId,
    pub product_codes: Vec<String>,
    pub billing: BillingSelection,
    pub shipping: ShippingSelection,
    pub request_id: RequestId,
}

impl OrderEvent {
    /// Builds the event payload for an order snapshot.
    pub fn from_order(order: &Order, request_id: RequestId) -> Self {
        Self {
            email: order.email.clone(),
            order_id: order.id,
            product_codes: order.product_codes(),
            billing: order.billing,
            shipping: order.shipping,
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::value_objects::{Carrier, Money, PaymentMethod, ShippingType};

    #[test]
    fn event_type_wire_tags() {
        assert_eq!(EventType::OrderCreated.as_str(), "ORDER_CREATED");
        assert_eq!(EventType::OrderDeleted.as_str(), "ORDER_DELETED");
        assert_eq!(
            serde_json::to_string(&EventType::ProductUpdated).unwrap(),
            "\"PRODUCT_UPDATED\""
        );
    }

    #[test]
    fn order_event_wire_shape() {
        let order = Order::build(
            "a@b.com",
            &[Product {
                id: "1".to_string(),
                code: "P1".to_string(),
                name: "Widget".to_string(),
                price: Money::from_cents(1000),
                model: "2026".to_string(),
            }],
            PaymentMethod::CreditCard,
            ShippingSelection {
                kind: ShippingType::Urgent,
                carrier: Carrier::Dhl,
            },
        );
        let request_id = RequestId::new();
        let event = OrderEvent::from_order(&order, request_id);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["orderId"], order.id.to_string());
        assert_eq!(json["productCodes"][0], "P1");
        assert_eq!(json["billing"]["payment"], "CREDIT_CARD");
        assert_eq!(json["billing"]["totalPrice"], 1000);
        assert_eq!(json["shipping"]["type"], "URGENT");
        assert_eq!(json["shipping"]["carrier"], "DHL");
        assert_eq!(json["requestId"], request_id.to_string());

        let decoded: OrderEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }
}
