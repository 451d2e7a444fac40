use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order lifecycle throughput (creations, transitions, cancellations)
// - Lifecycle event delivery outcomes and latency
//
// Delivery failures are a monitoring concern only: they surface here and in
// the error log, never to the caller whose mutation already committed.
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Lifecycle engine metrics
    pub orders_created: IntCounter,
    pub orders_cancelled: IntCounter,
    pub status_transitions: IntCounterVec,

    // Event publisher metrics
    pub events_published: IntCounterVec,
    pub events_failed: IntCounterVec,
    pub publish_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_cancelled =
            IntCounter::new("orders_cancelled_total", "Total orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new(
                "order_status_transitions_total",
                "Total order status transitions",
            ),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let events_published = IntCounterVec::new(
            Opts::new(
                "lifecycle_events_published_total",
                "Lifecycle events delivered to the channel",
            ),
            &["topic"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let events_failed = IntCounterVec::new(
            Opts::new(
                "lifecycle_events_failed_total",
                "Lifecycle events the channel failed to deliver",
            ),
            &["topic"],
        )?;
        registry.register(Box::new(events_failed.clone()))?;

        let publish_duration = HistogramVec::new(
            HistogramOpts::new(
                "lifecycle_event_publish_duration_seconds",
                "Time from dispatch to delivery acknowledgment",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["topic"],
        )?;
        registry.register(Box::new(publish_duration.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_cancelled,
            status_transitions,
            events_published,
            events_failed,
            publish_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_order_cancelled(&self) {
        self.orders_cancelled.inc();
    }

    pub fn record_status_transition(&self, from: &str, to: &str) {
        self.status_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_event_published(&self, topic: &str, duration_secs: f64) {
        self.events_published.with_label_values(&[topic]).inc();
        self.publish_duration
            .with_label_values(&[topic])
            .observe(duration_secs);
    }

    pub fn record_event_failed(&self, topic: &str) {
        self.events_failed.with_label_values(&[topic]).inc();
    }

    /// Current failure count for one topic. Test observability hook.
    pub fn events_failed_total(&self, topic: &str) -> u64 {
        self.events_failed.with_label_values(&[topic]).get()
    }

    /// Current delivered count for one topic. Test observability hook.
    pub fn events_published_total(&self, topic: &str) -> u64 {
        self.events_published.with_label_values(&[topic]).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_without_collision() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn record_lifecycle_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created();
        metrics.record_order_created();
        metrics.record_status_transition("PENDING", "CONFIRMED");
        metrics.record_order_cancelled();

        assert_eq!(metrics.orders_created.get(), 2);
        assert_eq!(metrics.orders_cancelled.get(), 1);
        assert_eq!(
            metrics
                .status_transitions
                .with_label_values(&["PENDING", "CONFIRMED"])
                .get(),
            1
        );
    }

    #[test]
    fn record_publish_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_event_published("order.created", 0.02);
        metrics.record_event_failed("order.created");

        assert_eq!(metrics.events_published_total("order.created"), 1);
        assert_eq!(metrics.events_failed_total("order.created"), 1);
        assert_eq!(metrics.events_failed_total("order.cancelled"), 0);
    }
}
