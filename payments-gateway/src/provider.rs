use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::events::ORDER_ID_METADATA_KEY;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("payment provider request failed: {0}")]
    Transport(String),
    #[error("payment provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid payment provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    Payment,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Unit price in minor units.
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Provider-neutral checkout session request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
    pub currency: String,
    pub order_id: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub payment_method_types: Vec<&'static str>,
    pub mode: CheckoutMode,
}

/// URLs reported by the provider for a created session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, ProviderError>;
}

/// Stripe REST client for hosted checkout sessions.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        })
    }

    /// Stripe form encoding with bracketed keys, e.g. `line_items[0][quantity]`.
    pub fn form_params(params: &CheckoutSessionParams) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), params.mode.as_str().to_string()),
            ("success_url".to_string(), params.success_url.clone()),
            ("cancel_url".to_string(), params.cancel_url.clone()),
            (format!("metadata[{ORDER_ID_METADATA_KEY}]"), params.order_id.clone()),
            (
                format!("payment_intent_data[metadata][{ORDER_ID_METADATA_KEY}]"),
                params.order_id.clone(),
            ),
        ];
        for (i, method) in params.payment_method_types.iter().enumerate() {
            form.push((format!("payment_method_types[{i}]"), method.to_string()));
        }
        for (i, item) in params.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((format!("{prefix}[price_data][currency]"), params.currency.clone()));
            form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
            form.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.to_string()));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        form
    }
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait::async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, ProviderError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&Self::form_params(params))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_slice::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            warn!(status = status.as_u16(), %message, order_id = %params.order_id, "Stripe rejected checkout session");
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }

        let session: CheckoutSession =
            serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        debug!(session_id = ?session.id, order_id = %params.order_id, "Created Stripe checkout session");
        Ok(session)
    }
}
