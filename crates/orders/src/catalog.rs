//! Product catalog collaborator.
//!
//! The catalog is an external system as far as this pipeline is concerned;
//! the only contract needed here is resolving product IDs to priced
//! products. An order fails validation when any requested ID does not
//! resolve.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::value_objects::Money;

/// A product as the catalog exposes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub code: String,
    pub name: String,
    pub price: Money,
    pub model: String,
}

/// Errors from the catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached.
    #[error("product catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only product lookup contract.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolves the given product IDs.
    ///
    /// Unknown IDs are simply absent from the result; callers detect
    /// missing products by comparing counts.
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, CatalogError>;
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<String, Product>,
    fail_on_lookup: bool,
}

/// In-memory product catalog for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// Adds or replaces a product, keyed by its ID.
    pub fn insert(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    /// Configures the catalog to fail lookups, simulating an outage.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, CatalogError> {
        let state = self.state.read().unwrap();

        if state.fail_on_lookup {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }

        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            code: format!("CODE-{id}"),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            model: "2026".to_string(),
        }
    }

    #[tokio::test]
    async fn resolves_known_ids() {
        let catalog = InMemoryProductCatalog::with_products([product("1", 1000), product("2", 1500)]);

        let found = catalog
            .get_by_ids(&["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_absent_from_result() {
        let catalog = InMemoryProductCatalog::with_products([product("1", 1000)]);

        let found = catalog
            .get_by_ids(&["1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_unavailable() {
        let catalog = InMemoryProductCatalog::with_products([product("1", 1000)]);
        catalog.set_fail_on_lookup(true);

        let result = catalog.get_by_ids(&["1".to_string()]).await;
        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }
}
