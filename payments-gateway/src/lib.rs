pub mod app;
pub mod config;
pub mod events;
pub mod metrics;
pub mod payment_handlers;
pub mod provider;
pub mod publisher;
pub mod service;
pub mod signature;

pub use app::{build_router, AppState};
pub use config::{ConfigError, GatewayConfig};
pub use metrics::GatewayMetrics;
pub use provider::{PaymentProvider, StripeClient};
pub use publisher::{EventPublisher, InMemoryPublisher, TracingPublisher};
pub use service::PaymentsService;
