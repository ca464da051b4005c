//! Order command and read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use common::{OrderId, RequestId};
use event_log::{EventLogStore, EventQueryService};
use orders::{
    BillingSelection, CreateOrder, DeleteOrder, Order, OrderProduct, OrderService, OrderStore,
    PaymentMethod, ProductCatalog, ShippingSelection,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, C: ProductCatalog, L: EventLogStore> {
    pub order_service: OrderService<S, C>,
    pub event_query: EventQueryService<L>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub email: String,
    #[serde(rename = "productIds")]
    pub product_ids: Vec<String>,
    pub payment: PaymentMethod,
    pub shipping: ShippingSelection,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub email: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub shipping: ShippingSelection,
    pub billing: BillingSelection,
    pub products: Vec<OrderProduct>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            email: order.email,
            created_at: order.created_at,
            shipping: order.shipping,
            billing: order.billing,
            products: order.products,
        }
    }
}

// -- Handlers --

/// POST /orders — validate against the catalog, persist, publish.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn create<S, C, L>(
    State(state): State<Arc<AppState<S, C, L>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    L: EventLogStore + 'static,
{
    let created = state
        .order_service
        .create_order(CreateOrder {
            email: req.email,
            product_ids: req.product_ids,
            payment: req.payment,
            shipping: req.shipping,
            request_id: RequestId::new(),
        })
        .await?;

    if !created.event_delivered {
        // Partial success: the order is committed, the notification
        // pipeline may be delayed. Callers still get a 201.
        tracing::warn!(order_id = %created.order.id, "order created with degraded event delivery");
    }

    Ok((StatusCode::CREATED, Json(created.order.into())))
}

/// GET /orders — one order, a customer's orders, or all orders, depending
/// on the query parameters.
#[tracing::instrument(skip(state))]
pub async fn list<S, C, L>(
    State(state): State<Arc<AppState<S, C, L>>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, ApiError>
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    L: EventLogStore + 'static,
{
    match (query.email, query.order_id) {
        (Some(email), Some(order_id)) => {
            let order_id = parse_order_id(&order_id)?;
            let order = state.order_service.get_order(&email, order_id).await?;
            Ok(Json(OrderResponse::from(order)).into_response())
        }
        (Some(email), None) => {
            let orders = state.order_service.list_orders(&email).await?;
            Ok(Json(to_responses(orders)).into_response())
        }
        (None, None) => {
            let orders = state.order_service.list_all_orders().await?;
            Ok(Json(to_responses(orders)).into_response())
        }
        (None, Some(_)) => Err(ApiError::BadRequest(
            "email is required when orderId is given".to_string(),
        )),
    }
}

/// DELETE /orders — remove an order; both query parameters are required.
#[tracing::instrument(skip(state))]
pub async fn delete<S, C, L>(
    State(state): State<Arc<AppState<S, C, L>>>,
    Query(query): Query<OrdersQuery>,
) -> Result<StatusCode, ApiError>
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    L: EventLogStore + 'static,
{
    let (Some(email), Some(order_id)) = (query.email, query.order_id) else {
        return Err(ApiError::BadRequest(
            "email and orderId are required".to_string(),
        ));
    };
    let order_id = parse_order_id(&order_id)?;

    let deleted = state
        .order_service
        .delete_order(DeleteOrder {
            email,
            order_id,
            request_id: RequestId::new(),
        })
        .await?;

    if !deleted.event_delivered {
        tracing::warn!(order_id = %deleted.order.id, "order deleted with degraded event delivery");
    }

    Ok(StatusCode::NO_CONTENT)
}

fn to_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid orderId format: {e}")))
}
