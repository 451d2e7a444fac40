use async_trait::async_trait;

// ============================================================================
// Messaging - Asynchronous delivery of order lifecycle events
// ============================================================================
//
// Structure:
// - DeliveryChannel  - at-least-once publish primitive (topic, key, payload)
// - KafkaChannel     - rdkafka-backed channel for production
// - InMemoryChannel  - recording channel for tests and broker-less runs
// - EventPublisher   - commit-then-publish dispatcher with outcome logging
//
// ============================================================================

mod kafka;
mod memory;
mod publisher;

pub use kafka::KafkaChannel;
pub use memory::{InMemoryChannel, SentRecord};
pub use publisher::EventPublisher;

/// Where the channel placed a successfully delivered record.
#[derive(Debug, Clone)]
pub struct RecordPlacement {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("send to {topic} rejected: {reason}")]
    Send { topic: String, reason: String },
}

/// At-least-once asynchronous publish primitive. Per-key ordering is the
/// channel's responsibility; retry and deadline policy live behind this
/// trait, never in the publisher.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<RecordPlacement, DeliveryError>;
}
