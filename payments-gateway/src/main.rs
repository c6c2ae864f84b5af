use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use payments_gateway::{
    build_router, AppState, EventPublisher, GatewayConfig, GatewayMetrics, PaymentsService,
    StripeClient,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(GatewayConfig::from_env()?);
    let metrics = Arc::new(GatewayMetrics::new()?);
    let provider = Arc::new(
        StripeClient::new(&config.stripe_api_base, &config.stripe_secret, config.stripe_timeout)
            .context("failed to build Stripe client")?,
    );
    let publisher = build_publisher(&config)?;

    let service = Arc::new(PaymentsService::new(config.clone(), provider, publisher, metrics));
    let app = build_router(AppState::new(service), &config);

    let addr = SocketAddr::new(config.host.parse().context("HOST must be an IP address")?, config.port);
    info!(%addr, bus_servers = ?config.bus_servers, "starting payments-gateway");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
fn build_publisher(config: &GatewayConfig) -> anyhow::Result<Arc<dyn EventPublisher>> {
    if config.bus_servers.is_empty() {
        warn!("KAFKA_BOOTSTRAP is empty; payment events will only be logged");
        return Ok(Arc::new(payments_gateway::TracingPublisher));
    }
    let publisher = payments_gateway::publisher::KafkaPublisher::connect(&config.bus_servers)
        .context("failed to create kafka producer")?;
    info!(servers = ?config.bus_servers, "Kafka publisher initialised");
    Ok(Arc::new(publisher))
}

#[cfg(not(any(feature = "kafka", feature = "kafka-producer")))]
fn build_publisher(config: &GatewayConfig) -> anyhow::Result<Arc<dyn EventPublisher>> {
    if !config.bus_servers.is_empty() {
        warn!(servers = ?config.bus_servers, "built without kafka-producer; payment events will only be logged");
    }
    Ok(Arc::new(payments_gateway::TracingPublisher))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to listen for SIGTERM"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
