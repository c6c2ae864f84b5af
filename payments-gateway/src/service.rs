use std::sync::Arc;

use bigdecimal::BigDecimal;
use common_http_errors::ApiError;
use common_money::{is_positive, to_minor_units};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::events::{EventKind, PaymentSucceeded, WebhookEvent, PAYMENT_SUCCEEDED_TOPIC};
use crate::metrics::GatewayMetrics;
use crate::provider::{
    CheckoutLineItem, CheckoutMode, CheckoutSessionParams, PaymentProvider, ProviderError,
};
use crate::publisher::EventPublisher;
use crate::signature::{verify_header, SignatureError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSessionItem {
    pub name: String,
    pub price: BigDecimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionRequest {
    pub currency: String,
    pub order_id: String,
    pub items: Vec<PaymentSessionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionResponse {
    pub cancel_url: Option<String>,
    pub success_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(message) => ApiError::bad_request("invalid_payment_session", message),
            SessionError::Provider(err) => ApiError::bad_gateway("provider_error", err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("invalid event payload: {0}")]
    Payload(String),
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::webhook_rejected(err.to_string())
    }
}

/// Result of a verified webhook call.
#[derive(Debug, Clone)]
pub struct WebhookOutcome {
    pub event: WebhookEvent,
    pub dispatched: Option<PaymentSucceeded>,
}

pub struct PaymentsService {
    config: Arc<GatewayConfig>,
    provider: Arc<dyn PaymentProvider>,
    publisher: Arc<dyn EventPublisher>,
    metrics: Arc<GatewayMetrics>,
}

impl PaymentsService {
    pub fn new(
        config: Arc<GatewayConfig>,
        provider: Arc<dyn PaymentProvider>,
        publisher: Arc<dyn EventPublisher>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self { config, provider, publisher, metrics }
    }

    pub fn metrics(&self) -> &Arc<GatewayMetrics> { &self.metrics }

    /// Translate an order into provider checkout params. Amounts become minor units.
    pub fn checkout_params(&self, req: &PaymentSessionRequest) -> Result<CheckoutSessionParams, SessionError> {
        if req.currency.trim().is_empty() {
            return Err(SessionError::Invalid("currency must not be empty".into()));
        }
        if req.order_id.trim().is_empty() {
            return Err(SessionError::Invalid("orderId must not be empty".into()));
        }
        if req.items.is_empty() {
            return Err(SessionError::Invalid("items must contain at least one line item".into()));
        }
        let mut line_items = Vec::with_capacity(req.items.len());
        for (idx, item) in req.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(SessionError::Invalid(format!("items[{idx}].name must not be empty")));
            }
            if !is_positive(&item.price) {
                return Err(SessionError::Invalid(format!("items[{idx}].price must be greater than 0")));
            }
            if item.quantity < 1 {
                return Err(SessionError::Invalid(format!("items[{idx}].quantity must be at least 1")));
            }
            let unit_amount = to_minor_units(&item.price)
                .map_err(|e| SessionError::Invalid(format!("items[{idx}].price: {e}")))?;
            line_items.push(CheckoutLineItem {
                name: item.name.clone(),
                unit_amount,
                quantity: item.quantity,
            });
        }
        Ok(CheckoutSessionParams {
            currency: req.currency.clone(),
            order_id: req.order_id.clone(),
            line_items,
            success_url: self.config.stripe_success_url.clone(),
            cancel_url: self.config.stripe_cancel_url.clone(),
            payment_method_types: vec!["card"],
            mode: CheckoutMode::Payment,
        })
    }

    pub async fn create_payment_session(
        &self,
        req: PaymentSessionRequest,
    ) -> Result<PaymentSessionResponse, SessionError> {
        let params = self.checkout_params(&req)?;
        let session = match self.provider.create_checkout_session(&params).await {
            Ok(session) => session,
            Err(err) => {
                self.metrics.record_checkout_session(false);
                warn!(error = %err, order_id = %req.order_id, "Checkout session creation failed");
                return Err(err.into());
            }
        };
        self.metrics.record_checkout_session(true);
        info!(order_id = %req.order_id, items = params.line_items.len(), "Checkout session created");
        Ok(PaymentSessionResponse {
            cancel_url: session.cancel_url,
            success_url: session.success_url,
            url: session.url,
        })
    }

    /// Verify a provider callback over its raw body and dispatch recognised events.
    pub async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let result = self.verify_and_parse(raw_body, signature, now);
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                self.metrics.record_webhook("rejected");
                warn!(error = %err, "Webhook rejected");
                return Err(err);
            }
        };

        let dispatched = match event.kind() {
            EventKind::ChargeSucceeded => {
                let charge = event.charge().map_err(|e| {
                    self.metrics.record_webhook("rejected");
                    WebhookError::Payload(format!("malformed charge object: {e}"))
                })?;
                let payload = PaymentSucceeded::from(charge);
                info!(?payload, event_id = %event.id, "Payment succeeded");
                self.publish_success(&payload).await;
                self.metrics.record_webhook("dispatched");
                Some(payload)
            }
            EventKind::Other(event_type) => {
                info!(%event_type, event_id = %event.id, "Unhandled event type");
                self.metrics.record_webhook("ignored");
                None
            }
        };
        Ok(WebhookOutcome { event, dispatched })
    }

    fn verify_and_parse(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, WebhookError> {
        verify_header(
            raw_body,
            signature,
            &self.config.stripe_webhook_secret,
            self.config.webhook_tolerance_secs,
            now,
        )?;
        serde_json::from_slice(raw_body).map_err(|e| WebhookError::Payload(e.to_string()))
    }

    // Fire-and-forget: failures are logged and counted, never surfaced to the caller.
    async fn publish_success(&self, payload: &PaymentSucceeded) {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                self.metrics.record_publish(false);
                warn!(error = %err, "Failed to serialize payment.succeeded payload");
                return;
            }
        };
        match self.publisher.publish(PAYMENT_SUCCEEDED_TOPIC, &value).await {
            Ok(()) => self.metrics.record_publish(true),
            Err(err) => {
                self.metrics.record_publish(false);
                warn!(error = %err, topic = PAYMENT_SUCCEEDED_TOPIC, "Failed to publish payment event");
            }
        }
    }
}
