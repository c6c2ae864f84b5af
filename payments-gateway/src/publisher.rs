use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("message bus not reachable: {0}")]
    Connect(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("failed to enqueue message: {0}")]
    Enqueue(String),
}

/// Outbound message bus. `publish` hands the message off and returns; it does
/// not wait for broker acknowledgement.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError>;
}

/// Stand-in used when no broker is configured.
#[derive(Debug, Default, Clone)]
pub struct TracingPublisher;

#[async_trait::async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
        info!(topic, %payload, "No message bus configured; event logged only");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Value,
}

/// Keeps every published message in memory.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self { Self::default() }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.messages.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
        let mut guard = self
            .messages
            .lock()
            .map_err(|e| PublishError::Enqueue(e.to_string()))?;
        guard.push(PublishedMessage { topic: topic.to_string(), payload: payload.clone() });
        Ok(())
    }
}

#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
pub use kafka::KafkaPublisher;

#[cfg(any(feature = "kafka", feature = "kafka-producer"))]
mod kafka {
    use super::{EventPublisher, PublishError};
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use rdkafka::ClientConfig;
    use serde_json::Value;
    use tracing::{debug, warn};

    #[derive(Clone)]
    pub struct KafkaPublisher {
        producer: FutureProducer,
    }

    impl KafkaPublisher {
        pub fn connect(servers: &[String]) -> Result<Self, PublishError> {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", servers.join(","))
                .set("message.timeout.ms", "5000")
                .create()
                .map_err(|e| PublishError::Connect(e.to_string()))?;
            Ok(Self { producer })
        }
    }

    #[async_trait::async_trait]
    impl EventPublisher for KafkaPublisher {
        async fn publish(&self, topic: &str, payload: &Value) -> Result<(), PublishError> {
            let bytes = serde_json::to_vec(payload).map_err(|e| PublishError::Serialization(e.to_string()))?;
            let record: FutureRecord<'_, str, [u8]> = FutureRecord::to(topic).payload(bytes.as_slice());
            let delivery = self
                .producer
                .send_result(record)
                .map_err(|(err, _)| PublishError::Enqueue(err.to_string()))?;
            let topic = topic.to_string();
            tokio::spawn(async move {
                match delivery.await {
                    Ok(Ok((partition, offset))) => debug!(%topic, partition, offset, "Kafka delivery confirmed"),
                    Ok(Err((err, _))) => warn!(%topic, error = %err, "Kafka delivery failed"),
                    Err(_) => warn!(%topic, "Kafka delivery future cancelled"),
                }
            });
            Ok(())
        }
    }
}
