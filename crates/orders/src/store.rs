//! Order persistence keyed by `(email, order_id)`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::order::Order;

/// Errors from the order persistence layer.
///
/// Store errors are infrastructure failures; "not found" is not an error at
/// this layer, absent keys are expressed as `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence layer could not serve the request.
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value persistence contract for order aggregates.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order. Order IDs are server-generated and effectively
    /// unique, so this is an unconditional put.
    async fn put(&self, order: Order) -> Result<(), StoreError>;

    /// Point read by composite key.
    async fn get(&self, email: &str, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders for one customer, oldest first.
    async fn query_by_email(&self, email: &str) -> Result<Vec<Order>, StoreError>;

    /// Every order in the store. Full-scan semantics; kept for the admin
    /// listing surface and discouraged for anything else.
    async fn scan(&self) -> Result<Vec<Order>, StoreError>;

    /// Atomically removes an order, returning the prior value.
    ///
    /// The read-and-remove must be a single atomic step so that two
    /// concurrent deletes of the same key cannot both observe a snapshot.
    async fn remove(&self, email: &str, order_id: OrderId) -> Result<Option<Order>, StoreError>;
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<(String, OrderId), Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put(&self, order: Order) -> Result<(), StoreError> {
        let key = (order.email.clone(), order.id);
        self.orders.write().await.insert(key, order);
        Ok(())
    }

    async fn get(&self, email: &str, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&(email.to_string(), order_id)).cloned())
    }

    async fn query_by_email(&self, email: &str) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.email == email)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(&b.id.as_uuid())));
        Ok(matching)
    }

    async fn scan(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.as_uuid().cmp(&b.id.as_uuid())));
        Ok(all)
    }

    async fn remove(&self, email: &str, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        // Single write-lock section: the winner of a concurrent delete race
        // takes the snapshot, the loser sees None.
        let mut orders = self.orders.write().await;
        Ok(orders.remove(&(email.to_string(), order_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::value_objects::{Carrier, Money, PaymentMethod, ShippingSelection, ShippingType};

    fn sample_order(email: &str) -> Order {
        Order::build(
            email,
            &[Product {
                id: "1".to_string(),
                code: "P1".to_string(),
                name: "Widget".to_string(),
                price: Money::from_cents(1000),
                model: "2026".to_string(),
            }],
            PaymentMethod::Cash,
            ShippingSelection {
                kind: ShippingType::Economic,
                carrier: Carrier::Ups,
            },
        )
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryOrderStore::new();
        let order = sample_order("a@b.com");
        store.put(order.clone()).await.unwrap();

        let found = store.get("a@b.com", order.id).await.unwrap();
        assert_eq!(found, Some(order));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        let found = store.get("a@b.com", OrderId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn query_by_email_filters_and_orders() {
        let store = InMemoryOrderStore::new();
        let first = sample_order("a@b.com");
        let second = sample_order("a@b.com");
        let other = sample_order("c@d.com");
        store.put(first.clone()).await.unwrap();
        store.put(second.clone()).await.unwrap();
        store.put(other).await.unwrap();

        let orders = store.query_by_email("a@b.com").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.email == "a@b.com"));
    }

    #[tokio::test]
    async fn scan_returns_everything() {
        let store = InMemoryOrderStore::new();
        store.put(sample_order("a@b.com")).await.unwrap();
        store.put(sample_order("c@d.com")).await.unwrap();

        assert_eq!(store.scan().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn remove_returns_prior_value_exactly_once() {
        let store = InMemoryOrderStore::new();
        let order = sample_order("a@b.com");
        store.put(order.clone()).await.unwrap();

        let removed = store.remove("a@b.com", order.id).await.unwrap();
        assert_eq!(removed, Some(order.clone()));

        let again = store.remove("a@b.com", order.id).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn concurrent_removes_have_one_winner() {
        let store = InMemoryOrderStore::new();
        let order = sample_order("a@b.com");
        store.put(order.clone()).await.unwrap();

        let (a, b) = tokio::join!(
            store.remove("a@b.com", order.id),
            store.remove("a@b.com", order.id)
        );

        let snapshots = [a.unwrap(), b.unwrap()];
        assert_eq!(snapshots.iter().filter(|s| s.is_some()).count(), 1);
    }
}
