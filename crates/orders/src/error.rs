//! Order domain error types.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A requested product ID did not resolve against the catalog.
    #[error("a product was not found")]
    ProductNotFound,

    /// The order does not exist, or vanished concurrently.
    #[error("order not found")]
    OrderNotFound,

    /// The catalog collaborator failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The persistence layer failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
