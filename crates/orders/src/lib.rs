pub mod catalog;
pub mod error;
pub mod events;
pub mod order;
pub mod publisher;
pub mod service;
pub mod store;
pub mod value_objects;

pub use catalog::{CatalogError, InMemoryProductCatalog, Product, ProductCatalog};
pub use common::{OrderId, RequestId};
pub use error::OrderError;
pub use events::{EventType, OrderEvent};
pub use order::Order;
pub use publisher::{OrderEventPublisher, PublishError};
pub use service::{CreateOrder, CreatedOrder, DeleteOrder, DeletedOrder, OrderService};
pub use store::{InMemoryOrderStore, OrderStore, StoreError};
pub use value_objects::{
    BillingSelection, Carrier, Money, OrderProduct, PaymentMethod, ShippingSelection, ShippingType,
};
