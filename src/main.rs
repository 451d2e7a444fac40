use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use food_order_service::api::{self, AppState};
use food_order_service::messaging::{DeliveryChannel, EventPublisher, InMemoryChannel, KafkaChannel};
use food_order_service::metrics::Metrics;
use food_order_service::pricing::FlatRateCatalog;
use food_order_service::service::OrderService;
use food_order_service::store::InMemoryOrderStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,food_order_service=debug")),
        )
        .init();

    tracing::info!("Starting food order service");

    let http_port: u16 = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let metrics = Arc::new(Metrics::new()?);

    // Without a broker configured, lifecycle events stay on an in-process
    // channel so the service remains usable for local development.
    let channel: Arc<dyn DeliveryChannel> = match std::env::var("KAFKA_BROKERS") {
        Ok(brokers) if !brokers.is_empty() => {
            tracing::info!(brokers = %brokers, "Using Kafka delivery channel");
            Arc::new(KafkaChannel::new(&brokers)?)
        }
        _ => {
            tracing::warn!("KAFKA_BROKERS not set; using in-memory delivery channel");
            Arc::new(InMemoryChannel::new())
        }
    };

    let publisher = EventPublisher::new(channel, metrics.clone());
    let store = Arc::new(InMemoryOrderStore::new());
    let catalog = Arc::new(FlatRateCatalog::default());
    let service = Arc::new(OrderService::new(store, publisher, catalog, metrics.clone()));

    api::run(AppState { service, metrics }, http_port).await?;

    Ok(())
}
