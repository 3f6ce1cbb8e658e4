//! HTTP API server for audited order checkout.
//!
//! Provides the checkout endpoint and order read endpoints over the
//! ordering repository, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{LogNotificationGateway, NotificationGateway};
use common::Actor;
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, N>(state: Arc<AppState<S, N>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::create::<S, N>))
        .route("/orders", get(routes::orders::list::<S, N>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S, N>).delete(routes::orders::delete::<S, N>),
        )
        .route(
            "/orders/user/{user_name}",
            get(routes::orders::by_user_name::<S, N>),
        )
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

/// Registers descriptions for the metrics the checkout path records.
pub fn describe_metrics() {
    metrics::describe_counter!("checkout_total", "Checkout requests handled");
    metrics::describe_counter!(
        "checkout_failures_total",
        "Checkouts that failed to persist the order"
    );
    metrics::describe_counter!(
        "checkout_notification_failures_total",
        "Confirmation emails the gateway failed to send"
    );
    metrics::describe_counter!("unit_of_work_commits_total", "Successful commits");
    metrics::describe_counter!(
        "unit_of_work_commit_failures_total",
        "Commits rejected by the store"
    );
    metrics::describe_histogram!(
        "unit_of_work_commit_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent stamping and writing one commit"
    );
}

/// Creates the default application state, logging confirmation emails
/// instead of sending them.
pub fn create_default_state<S: OrderStore + Clone + 'static>(
    store: S,
    service_actor: Actor,
) -> Arc<AppState<S, LogNotificationGateway>> {
    Arc::new(AppState::new(store, LogNotificationGateway::new(), service_actor))
}
