use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub const SERVICE_NAME: &str = "payments-gateway";

#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    checkout_sessions: IntCounterVec,
    webhook_events: IntCounterVec,
    bus_publishes: IntCounterVec,
    http_errors: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let checkout_sessions = IntCounterVec::new(
            Opts::new("payments_checkout_sessions_total", "Checkout session requests grouped by result"),
            &["result"],
        )?;
        let webhook_events = IntCounterVec::new(
            Opts::new("payments_webhook_events_total", "Webhook calls grouped by outcome"),
            &["outcome"],
        )?;
        let bus_publishes = IntCounterVec::new(
            Opts::new("payments_bus_publishes_total", "Message bus publishes grouped by result"),
            &["result"],
        )?;
        let http_errors = IntCounterVec::new(
            Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
            &["service", "code", "status"],
        )?;
        registry.register(Box::new(checkout_sessions.clone()))?;
        registry.register(Box::new(webhook_events.clone()))?;
        registry.register(Box::new(bus_publishes.clone()))?;
        registry.register(Box::new(http_errors.clone()))?;
        Ok(Self {
            registry,
            checkout_sessions,
            webhook_events,
            bus_publishes,
            http_errors,
        })
    }

    pub fn record_checkout_session(&self, created: bool) {
        let result = if created { "created" } else { "failed" };
        self.checkout_sessions.with_label_values(&[result]).inc();
    }

    /// `outcome` is one of `rejected`, `dispatched`, `ignored`.
    pub fn record_webhook(&self, outcome: &str) {
        self.webhook_events.with_label_values(&[outcome]).inc();
    }

    pub fn record_publish(&self, ok: bool) {
        let result = if ok { "ok" } else { "failed" };
        self.bus_publishes.with_label_values(&[result]).inc();
    }

    pub fn record_http_error(&self, code: &str, status: StatusCode) {
        self.http_errors
            .with_label_values(&[SERVICE_NAME, code, status.as_str()])
            .inc();
    }

    pub fn webhook_count(&self, outcome: &str) -> u64 {
        self.webhook_events.with_label_values(&[outcome]).get()
    }

    pub fn publish_count(&self, ok: bool) -> u64 {
        let result = if ok { "ok" } else { "failed" };
        self.bus_publishes.with_label_values(&[result]).get()
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
