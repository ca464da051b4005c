//! The order aggregate.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::value_objects::{
    BillingSelection, Money, OrderProduct, PaymentMethod, ShippingSelection,
};

/// An order aggregate, identified by `(email, id)`.
///
/// Orders are immutable after creation: there is no update operation, only
/// hard delete. The billing total is computed server-side from catalog
/// prices when the order is built and is never taken from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Customer identity; partition half of the composite key.
    pub email: String,

    /// Server-generated order identity; sort half of the composite key.
    pub id: OrderId,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    pub shipping: ShippingSelection,

    pub billing: BillingSelection,

    /// Line items captured at creation time.
    pub products: Vec<OrderProduct>,
}

impl Order {
    /// Builds a new order from resolved catalog products.
    ///
    /// The order ID is generated here, never supplied by the caller, and
    /// the billing total is the sum of the resolved product prices.
    pub fn build(
        email: impl Into<String>,
        products: &[Product],
        payment: PaymentMethod,
        shipping: ShippingSelection,
    ) -> Self {
        let line_items: Vec<OrderProduct> = products
            .iter()
            .map(|p| OrderProduct {
                code: p.code.clone(),
                price: p.price,
            })
            .collect();
        let total_price: Money = line_items.iter().map(|p| p.price).sum();

        Self {
            email: email.into(),
            id: OrderId::new(),
            created_at: Utc::now(),
            shipping,
            billing: BillingSelection {
                payment,
                total_price,
            },
            products: line_items,
        }
    }

    /// Returns the product codes of all line items.
    pub fn product_codes(&self) -> Vec<String> {
        self.products.iter().map(|p| p.code.clone()).collect()
    }

    /// Returns the server-computed order total.
    pub fn total_price(&self) -> Money {
        self.billing.total_price
    }
}
