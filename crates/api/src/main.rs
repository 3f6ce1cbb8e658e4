//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use checkout::NotificationGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::{InMemoryOrderStore, OrderStore, PostgresOrderStore, SeedOutcome};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Seeds the store if configured, then serves until shutdown.
async fn serve<S, N>(config: Config, state: Arc<api::AppState<S, N>>, metrics: PrometheusHandle)
where
    S: OrderStore + Clone + 'static,
    N: NotificationGateway + 'static,
{
    if config.seed_on_startup {
        match state.repository.seed(&config.service_actor).await {
            Ok(SeedOutcome::Seeded(count)) => tracing::info!(count, "seeded order collection"),
            Ok(SeedOutcome::AlreadyPopulated) => {
                tracing::info!("order collection already populated")
            }
            Err(e) => panic!("failed to seed order collection: {e}"),
        }
    }

    let app = api::create_app(state, metrics);

    let addr = config.addr();
    tracing::info!(%addr, actor = %config.service_actor, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    api::describe_metrics();

    // 3. Select the order store and serve
    match config.database_url.clone() {
        Some(url) => {
            tracing::info!(
                max_connections = config.database_max_connections,
                "using PostgreSQL order store"
            );
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&url)
                .await
                .expect("failed to connect to database");

            let store = PostgresOrderStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");

            let state = api::create_default_state(store, config.service_actor.clone());
            serve(config, state, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory only");
            let state =
                api::create_default_state(InMemoryOrderStore::new(), config.service_actor.clone());
            serve(config, state, metrics_handle).await;
        }
    }
}
