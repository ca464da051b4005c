//! Event history endpoint over the audit log.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use event_log::{EventLogStore, OrderEventSummary};
use orders::{OrderStore, ProductCatalog};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub email: Option<String>,
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

/// GET /orders/events — event summaries for a customer, optionally
/// narrowed by an event-type prefix. `email` is required.
#[tracing::instrument(skip(state))]
pub async fn list<S, C, L>(
    State(state): State<Arc<AppState<S, C, L>>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<OrderEventSummary>>, ApiError>
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    L: EventLogStore + 'static,
{
    let summaries = state
        .event_query
        .get_by_customer(
            query.email.as_deref().unwrap_or(""),
            query.event_type.as_deref(),
        )
        .await?;

    Ok(Json(summaries))
}
