use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DeliveryChannel, DeliveryError, RecordPlacement};

// ============================================================================
// In-Memory Delivery Channel
// ============================================================================

/// A record accepted by the in-memory channel, in arrival order.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// Channel that appends every send to an in-process log. Used by tests as a
/// single-consumer harness and by broker-less development runs. Arrival order
/// is the observed delivery order, so per-key ordering holds trivially.
pub struct InMemoryChannel {
    sent: RwLock<Vec<SentRecord>>,
    failing: AtomicBool,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// While enabled, every send reports a delivery failure.
    pub fn fail_sends(&self, enabled: bool) {
        self.failing.store(enabled, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentRecord> {
        self.sent.read().await.clone()
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryChannel for InMemoryChannel {
    async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<RecordPlacement, DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Send {
                topic: topic.to_string(),
                reason: "simulated broker failure".to_string(),
            });
        }

        let mut sent = self.sent.write().await;
        sent.push(SentRecord {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });

        Ok(RecordPlacement {
            topic: topic.to_string(),
            partition: 0,
            offset: (sent.len() - 1) as i64,
        })
    }
}
