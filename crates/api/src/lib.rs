//! HTTP API server and process wiring for the order pipeline.
//!
//! Exposes the order command/read surface and the event history query,
//! with structured logging (tracing) and Prometheus metrics, and wires the
//! topic fan-out: audit-log sink and payment notifier push-direct, email
//! notification through the work queue.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use event_bus::{EventFilter, Subscription, Topic, WorkQueue};
use event_log::{EventLogSink, EventLogStore, EventQueryService, InMemoryEventLogStore};
use metrics_exporter_prometheus::PrometheusHandle;
use notifier::{EmailWorker, PaymentNotifier, RecordingEmailSender};
use orders::{
    EventType, InMemoryOrderStore, InMemoryProductCatalog, OrderEventPublisher, OrderService,
    OrderStore, ProductCatalog,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Delivery ceiling on the email queue before a message is dead-lettered.
const MAX_RECEIVE_COUNT: u32 = 3;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C, L>(state: Arc<AppState<S, C, L>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    L: EventLogStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            axum::routing::post(routes::orders::create::<S, C, L>)
                .get(routes::orders::list::<S, C, L>)
                .delete(routes::orders::delete::<S, C, L>),
        )
        .route("/orders/events", get(routes::events::list::<S, C, L>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Handles onto the wired pipeline, used by `main` to drive the email
/// worker and by tests to observe fan-out side effects.
pub struct PipelineHandles {
    pub topic: Topic,
    pub email_queue: WorkQueue,
    pub email_worker: Arc<EmailWorker<RecordingEmailSender>>,
    pub email_sender: RecordingEmailSender,
    pub payment_notifier: Arc<PaymentNotifier>,
    pub order_store: InMemoryOrderStore,
    pub event_log: InMemoryEventLogStore,
}

/// Application state over the in-process store implementations.
pub type DefaultAppState =
    AppState<InMemoryOrderStore, InMemoryProductCatalog, InMemoryEventLogStore>;

/// Creates the default application state and subscribes the standard
/// consumers: audit-log sink (unfiltered, push-direct), payment notifier
/// (push-direct, `ORDER_CREATED` only), and the email work queue
/// (`ORDER_CREATED` only).
pub fn create_default_state(
    catalog: InMemoryProductCatalog,
) -> (Arc<DefaultAppState>, PipelineHandles) {
    let topic = Topic::new("order-events");

    let event_log = InMemoryEventLogStore::new();
    topic.subscribe(Subscription::push(Arc::new(EventLogSink::new(
        event_log.clone(),
    ))));

    let payment_notifier = Arc::new(PaymentNotifier::new());
    topic.subscribe(
        Subscription::push(payment_notifier.clone())
            .with_filter(EventFilter::allowlist([EventType::OrderCreated.as_str()])),
    );

    let email_queue = WorkQueue::new("order-events-queue", MAX_RECEIVE_COUNT);
    topic.subscribe(
        Subscription::queued(email_queue.clone())
            .with_filter(EventFilter::allowlist([EventType::OrderCreated.as_str()])),
    );

    let order_store = InMemoryOrderStore::new();
    let order_service = OrderService::new(
        order_store.clone(),
        catalog,
        OrderEventPublisher::new(topic.clone()),
    );
    let event_query = EventQueryService::new(event_log.clone());

    let email_sender = RecordingEmailSender::new();
    let email_worker = Arc::new(EmailWorker::new(email_queue.clone(), email_sender.clone()));

    let state = Arc::new(AppState {
        order_service,
        event_query,
    });

    let handles = PipelineHandles {
        topic,
        email_queue,
        email_worker,
        email_sender,
        payment_notifier,
        order_store,
        event_log,
    };

    (state, handles)
}
