use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Order, OrderStatus};

// ============================================================================
// Order Lifecycle Events
// ============================================================================
//
// Immutable notifications emitted after a lifecycle mutation has been
// durably committed to the order store. Never part of the aggregate itself.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderLifecycleEvent {
    Created(OrderCreated),
    StatusChanged(OrderStatusChanged),
    Cancelled(OrderCancelled),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_id: u64,
    pub restaurant_id: u64,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: Uuid,
    pub order_number: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_id: u64,
    pub restaurant_id: u64,
    pub total_amount: Decimal,
    pub cancelled_at: DateTime<Utc>,
}

impl OrderLifecycleEvent {
    pub fn created(order: &Order) -> Self {
        OrderLifecycleEvent::Created(OrderCreated {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            total_amount: order.total_amount,
            created_at: order.created_at,
        })
    }

    pub fn status_changed(order: &Order, old_status: OrderStatus) -> Self {
        OrderLifecycleEvent::StatusChanged(OrderStatusChanged {
            order_id: order.id,
            order_number: order.order_number.clone(),
            old_status,
            new_status: order.status,
            changed_at: order.updated_at,
        })
    }

    pub fn cancelled(order: &Order) -> Self {
        OrderLifecycleEvent::Cancelled(OrderCancelled {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            total_amount: order.total_amount,
            cancelled_at: order.updated_at,
        })
    }

    /// One topic per event kind.
    pub fn topic(&self) -> &'static str {
        match self {
            OrderLifecycleEvent::Created(_) => "order.created",
            OrderLifecycleEvent::StatusChanged(_) => "order.status.changed",
            OrderLifecycleEvent::Cancelled(_) => "order.cancelled",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OrderLifecycleEvent::Created(_) => "OrderCreated",
            OrderLifecycleEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderLifecycleEvent::Cancelled(_) => "OrderCancelled",
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            OrderLifecycleEvent::Created(e) => e.order_id,
            OrderLifecycleEvent::StatusChanged(e) => e.order_id,
            OrderLifecycleEvent::Cancelled(e) => e.order_id,
        }
    }

    /// Every event for an order shares the order id as its partition key,
    /// so a single consumer observes them in commit order.
    pub fn partition_key(&self) -> String {
        self.order_id().to_string()
    }
}
