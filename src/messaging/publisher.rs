use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::DeliveryChannel;
use crate::domain::order::OrderLifecycleEvent;
use crate::metrics::Metrics;

// ============================================================================
// Event Publisher
// ============================================================================
//
// Hands committed lifecycle changes to the delivery channel. Callers invoke
// `publish` only AFTER the order store has acknowledged the triggering write;
// `publish` itself never blocks on broker I/O. Events are enqueued in caller
// order and drained by a single worker task that dispatches sends to the
// channel sequentially, so the channel observes them in commit order and
// per-key ordering holds end to end. The worker only logs outcomes and bumps
// counters — a failed delivery never reaches the mutation caller.
//
// ============================================================================

struct QueuedEvent {
    order_id: Uuid,
    kind: &'static str,
    topic: &'static str,
    key: String,
    payload: String,
}

#[derive(Clone)]
pub struct EventPublisher {
    queue: mpsc::UnboundedSender<QueuedEvent>,
    metrics: Arc<Metrics>,
}

impl EventPublisher {
    /// Spawns the dispatch worker; must be called within a Tokio runtime.
    pub fn new(channel: Arc<dyn DeliveryChannel>, metrics: Arc<Metrics>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch_loop(rx, channel, metrics.clone()));
        Self { queue, metrics }
    }

    /// Fire-and-forget handoff of one committed lifecycle event. All events
    /// for an order are keyed by its id, keeping them on one ordered stream.
    pub fn publish(&self, event: &OrderLifecycleEvent) {
        let order_id = event.order_id();
        let kind = event.kind();
        let topic = event.topic();

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(
                    order_id = %order_id,
                    event = kind,
                    error = %error,
                    "Failed to serialize lifecycle event"
                );
                self.metrics.record_event_failed(topic);
                return;
            }
        };

        let queued = QueuedEvent {
            order_id,
            kind,
            topic,
            key: event.partition_key(),
            payload,
        };

        if self.queue.send(queued).is_err() {
            // Worker gone; only possible during shutdown.
            tracing::error!(
                order_id = %order_id,
                event = kind,
                "Dispatch worker unavailable, lifecycle event dropped"
            );
            self.metrics.record_event_failed(topic);
        }
    }
}

/// Drains the queue one event at a time. Sequential awaits keep the dispatch
/// order identical to the enqueue (commit) order.
async fn dispatch_loop(
    mut rx: mpsc::UnboundedReceiver<QueuedEvent>,
    channel: Arc<dyn DeliveryChannel>,
    metrics: Arc<Metrics>,
) {
    while let Some(event) = rx.recv().await {
        let started = Instant::now();

        match channel.send(event.topic, &event.key, &event.payload).await {
            Ok(placement) => {
                tracing::info!(
                    order_id = %event.order_id,
                    event = event.kind,
                    topic = %placement.topic,
                    partition = placement.partition,
                    offset = placement.offset,
                    "Lifecycle event delivered"
                );
                metrics.record_event_published(event.topic, started.elapsed().as_secs_f64());
            }
            Err(error) => {
                tracing::error!(
                    order_id = %event.order_id,
                    event = event.kind,
                    topic = event.topic,
                    error = %error,
                    "Lifecycle event delivery failed"
                );
                metrics.record_event_failed(event.topic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::order::{Order, OrderStatus};
    use crate::messaging::InMemoryChannel;

    fn committed_order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-0F0F0F0F".to_string(),
            customer_id: 1,
            restaurant_id: 7,
            delivery_address: "1 Main St".to_string(),
            contact_phone: "+15551234567".to_string(),
            special_instructions: None,
            items: vec![],
            total_amount: Decimal::new(2000, 2),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    async fn wait_for_sends(channel: &InMemoryChannel, expected: usize) {
        for _ in 0..500 {
            if channel.sent().await.len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!(
            "expected {expected} sends, observed {}",
            channel.sent().await.len()
        );
    }

    #[tokio::test]
    async fn publish_delivers_keyed_by_order_id() {
        let channel = Arc::new(InMemoryChannel::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = EventPublisher::new(channel.clone(), metrics);

        let order = committed_order();
        publisher.publish(&OrderLifecycleEvent::created(&order));
        wait_for_sends(&channel, 1).await;

        let sent = channel.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].topic, "order.created");
        assert_eq!(sent[0].key, order.id.to_string());
        assert!(sent[0].payload.contains(&order.order_number));
    }

    #[tokio::test]
    async fn publish_preserves_dispatch_order_per_key() {
        let channel = Arc::new(InMemoryChannel::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = EventPublisher::new(channel.clone(), metrics);

        let mut order = committed_order();
        publisher.publish(&OrderLifecycleEvent::created(&order));
        let old = order.status;
        order.status = OrderStatus::Confirmed;
        publisher.publish(&OrderLifecycleEvent::status_changed(&order, old));
        wait_for_sends(&channel, 2).await;

        let sent = channel.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].topic, "order.created");
        assert_eq!(sent[1].topic, "order.status.changed");
        assert_eq!(sent[0].key, sent[1].key);
    }

    /// Publish order must hold on a parallel scheduler too, not just on the
    /// single-threaded test runtime: the queue serializes dispatch.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn commit_order_holds_on_multi_thread_runtime() {
        let channel = Arc::new(InMemoryChannel::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = EventPublisher::new(channel.clone(), metrics);

        let rounds = 500;
        let mut order_ids = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            let mut order = committed_order();
            order_ids.push(order.id);
            publisher.publish(&OrderLifecycleEvent::created(&order));
            let old = order.status;
            order.status = OrderStatus::Confirmed;
            publisher.publish(&OrderLifecycleEvent::status_changed(&order, old));
        }
        wait_for_sends(&channel, rounds * 2).await;

        let sent = channel.sent().await;
        assert_eq!(sent.len(), rounds * 2);
        for order_id in order_ids {
            let key = order_id.to_string();
            let positions: Vec<usize> = sent
                .iter()
                .enumerate()
                .filter(|(_, r)| r.key == key)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(positions.len(), 2);
            assert_eq!(sent[positions[0]].topic, "order.created");
            assert_eq!(sent[positions[1]].topic, "order.status.changed");
        }
    }

    #[tokio::test]
    async fn delivery_failure_is_contained() {
        let channel = Arc::new(InMemoryChannel::new());
        channel.fail_sends(true);
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = EventPublisher::new(channel.clone(), metrics.clone());

        let order = committed_order();
        publisher.publish(&OrderLifecycleEvent::created(&order));

        for _ in 0..500 {
            if metrics.events_failed_total("order.created") == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(channel.sent().await.is_empty());
        assert_eq!(metrics.events_failed_total("order.created"), 1);
    }
}
