use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use common_http_errors::{ApiError, ERROR_CODE_HEADER};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::GatewayConfig;
use crate::metrics::GatewayMetrics;
use crate::payment_handlers::{create_payment_session, payment_cancelled, payment_success, stripe_webhook};
use crate::service::PaymentsService;
use crate::signature::SIGNATURE_HEADER;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PaymentsService>,
    pub metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(service: Arc<PaymentsService>) -> Self {
        let metrics = service.metrics().clone();
        Self { service, metrics }
    }
}

pub async fn health() -> &'static str { "ok" }

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(resp) => resp,
        Err(err) => ApiError::internal(err).into_response(),
    }
}

pub async fn http_error_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get(ERROR_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        state.metrics.record_http_error(code, status);
    }
    resp
}

pub fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            config
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(SIGNATURE_HEADER),
        ])
}

pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/payments/create-payment-session", post(create_payment_session))
        .route("/payments/webhook", post(stripe_webhook))
        .route("/payments/success", get(payment_success))
        .route("/payments/cancel", get(payment_cancelled))
        .layer(middleware::from_fn_with_state(state.clone(), http_error_metrics))
        .with_state(state)
        .layer(cors_layer(config))
}
