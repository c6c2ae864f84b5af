use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bus topic for confirmed card charges.
pub const PAYMENT_SUCCEEDED_TOPIC: &str = "payment.succeeded";

/// Charge metadata key carrying the caller's order id.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

/// Stripe event envelope. Fields this service does not read are kept in
/// `extra` so the event can be echoed back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ChargeSucceeded,
    Other(String),
}

impl EventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "charge.succeeded" => EventKind::ChargeSucceeded,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from_type(&self.event_type)
    }

    /// Typed view of `data.object` for charge events.
    pub fn charge(&self) -> Result<Charge, serde_json::Error> {
        Charge::deserialize(&self.data.object)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

/// Payload published on [`PAYMENT_SUCCEEDED_TOPIC`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceeded {
    pub stripe_payment_id: String,
    pub order_id: Option<String>,
    pub receipt_url: Option<String>,
}

impl From<Charge> for PaymentSucceeded {
    fn from(mut charge: Charge) -> Self {
        Self {
            order_id: charge.metadata.remove(ORDER_ID_METADATA_KEY),
            stripe_payment_id: charge.id,
            receipt_url: charge.receipt_url,
        }
    }
}
