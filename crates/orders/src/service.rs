//! Order command handler: the transactional boundary for order writes.

use common::{OrderId, RequestId};

use crate::catalog::ProductCatalog;
use crate::error::OrderError;
use crate::events::{EventType, OrderEvent};
use crate::order::Order;
use crate::publisher::OrderEventPublisher;
use crate::store::OrderStore;
use crate::value_objects::{PaymentMethod, ShippingSelection};

/// Command to create an order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub email: String,
    pub product_ids: Vec<String>,
    pub payment: PaymentMethod,
    pub shipping: ShippingSelection,
    pub request_id: RequestId,
}

/// Command to delete an order.
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    pub email: String,
    pub order_id: OrderId,
    pub request_id: RequestId,
}

/// Outcome of a successful create.
///
/// `event_delivered` is false when the order was persisted but the event
/// broadcast failed. That is a degraded success, not an error: the
/// notification pipeline may be delayed, the order is committed either way.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub event_delivered: bool,
}

/// Outcome of a successful delete, carrying the removed snapshot.
#[derive(Debug, Clone)]
pub struct DeletedOrder {
    pub order: Order,
    pub event_delivered: bool,
}

/// Service handling order commands and reads.
///
/// Holds its store, catalog, and publisher dependencies; constructed once
/// per process and shared across requests.
pub struct OrderService<S, C> {
    store: S,
    catalog: C,
    publisher: OrderEventPublisher,
}

impl<S: OrderStore, C: ProductCatalog> OrderService<S, C> {
    /// Creates a new order service.
    pub fn new(store: S, catalog: C, publisher: OrderEventPublisher) -> Self {
        Self {
            store,
            catalog,
            publisher,
        }
    }

    /// Validates the request against the catalog, persists the order, then
    /// broadcasts `ORDER_CREATED`.
    ///
    /// Persistence and publication are deliberately independent: the order
    /// write must succeed before publication is attempted, and a publish
    /// failure does not roll the order back. Duplicate or late events are
    /// tolerable; a lost order is not.
    #[tracing::instrument(skip(self, cmd), fields(email = %cmd.email, request_id = %cmd.request_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<CreatedOrder, OrderError> {
        let products = self.catalog.get_by_ids(&cmd.product_ids).await?;
        if products.len() != cmd.product_ids.len() {
            return Err(OrderError::ProductNotFound);
        }

        let order = Order::build(cmd.email, &products, cmd.payment, cmd.shipping);
        self.store.put(order.clone()).await?;
        metrics::counter!("orders_created").increment(1);

        let event_delivered = self
            .broadcast(EventType::OrderCreated, &order, cmd.request_id)
            .await;

        Ok(CreatedOrder {
            order,
            event_delivered,
        })
    }

    /// Exact lookup by `(email, order_id)`.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, email: &str, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .get(email, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// All orders for one customer.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.query_by_email(email).await?)
    }

    /// Every order in the store. Full-scan semantics.
    #[tracing::instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.scan().await?)
    }

    /// Atomically removes the order and broadcasts `ORDER_DELETED` with the
    /// removed snapshot.
    ///
    /// Under concurrent deletes of the same key exactly one caller gets the
    /// snapshot (and the single event emission); the rest see
    /// [`OrderError::OrderNotFound`].
    #[tracing::instrument(skip(self, cmd), fields(email = %cmd.email, order_id = %cmd.order_id))]
    pub async fn delete_order(&self, cmd: DeleteOrder) -> Result<DeletedOrder, OrderError> {
        let order = self
            .store
            .remove(&cmd.email, cmd.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        metrics::counter!("orders_deleted").increment(1);

        let event_delivered = self
            .broadcast(EventType::OrderDeleted, &order, cmd.request_id)
            .await;

        Ok(DeletedOrder {
            order,
            event_delivered,
        })
    }

    async fn broadcast(&self, event_type: EventType, order: &Order, request_id: RequestId) -> bool {
        let event = OrderEvent::from_order(order, request_id);
        match self.publisher.publish(event_type, &event).await {
            Ok(receipt) => {
                tracing::debug!(
                    message_id = %receipt.message_id,
                    order_id = %order.id,
                    "order event accepted by router"
                );
                true
            }
            Err(err) => {
                metrics::counter!("order_events_publish_failed").increment(1);
                tracing::error!(
                    order_id = %order.id,
                    event_type = %event_type,
                    error = %err,
                    "order write committed but event publication failed"
                );
                false
            }
        }
    }
}
