use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};

use super::{DeliveryChannel, DeliveryError, RecordPlacement};

// ============================================================================
// Kafka Delivery Channel
// ============================================================================

pub struct KafkaChannel {
    producer: FutureProducer,
}

impl KafkaChannel {
    pub fn new(brokers: &str) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }
}

#[async_trait]
impl DeliveryChannel for KafkaChannel {
    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<RecordPlacement, DeliveryError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
        {
            Ok((partition, offset)) => Ok(RecordPlacement {
                topic: topic.to_string(),
                partition,
                offset,
            }),
            Err((kafka_error, _)) => Err(DeliveryError::Send {
                topic: topic.to_string(),
                reason: kafka_error.to_string(),
            }),
        }
    }
}
