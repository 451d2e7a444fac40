use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::order::{
    generate_order_number, CreateOrderRequest, Order, OrderError, OrderItem, OrderLifecycleEvent,
    OrderStatus,
};
use crate::messaging::EventPublisher;
use crate::metrics::Metrics;
use crate::pricing::PriceCatalog;
use crate::store::OrderStore;

// ============================================================================
// Order Service - Lifecycle Engine
// ============================================================================
//
// Owns the order status state machine and the commit-then-publish sequence:
// every mutation is persisted through the store first, and only a confirmed
// write hands an event to the publisher. Store and publish are sequenced, not
// one atomic unit — an event can never describe a state change that might
// still be rolled back.
//
// ============================================================================

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    publisher: EventPublisher,
    catalog: Arc<dyn PriceCatalog>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        publisher: EventPublisher,
        catalog: Arc<dyn PriceCatalog>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            publisher,
            catalog,
            metrics,
        }
    }

    /* ---------- Create ---------- */

    pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        tracing::info!(
            customer_id = request.customer_id,
            restaurant_id = request.restaurant_id,
            item_count = request.items.len(),
            "Creating order"
        );

        self.validate(&request)?;

        let mut items = Vec::with_capacity(request.items.len());
        let mut total_amount = Decimal::ZERO;

        for item in &request.items {
            let unit_price = self
                .catalog
                .unit_price(item.menu_item_id)
                .ok_or(OrderError::UnknownMenuItem(item.menu_item_id))?;
            let total_price = unit_price * Decimal::from(item.quantity);
            total_amount += total_price;

            items.push(OrderItem {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                unit_price,
                total_price,
                special_instructions: item.special_instructions.clone(),
            });
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::nil(), // store assigns on insert
            order_number: generate_order_number(),
            customer_id: request.customer_id,
            restaurant_id: request.restaurant_id,
            delivery_address: request.delivery_address,
            contact_phone: request.contact_phone,
            special_instructions: request.special_instructions,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let order = self.store.save(order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_amount = %order.total_amount,
            "Order persisted"
        );
        self.metrics.record_order_created();

        // The insert is acknowledged; only now may the event leave the process.
        self.publisher.publish(&OrderLifecycleEvent::created(&order));

        Ok(order)
    }

    /* ---------- Queries ---------- */

    pub async fn get(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.store.find_by_id(order_id).await?)
    }

    pub async fn by_customer(&self, customer_id: u64) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.find_by_customer(customer_id).await?)
    }

    pub async fn by_restaurant(&self, restaurant_id: u64) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.find_by_restaurant(restaurant_id).await?)
    }

    pub async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.find_by_status(status).await?)
    }

    /* ---------- Transition ---------- */

    /// Permissive state machine: any status change is allowed, including a
    /// same-status no-op, except leaving a terminal status. Ordering rules for
    /// intermediate statuses belong to the surrounding workflow.
    pub async fn transition(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut order = self
            .store
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.status.is_terminal() {
            tracing::warn!(
                order_id = %order_id,
                status = order.status.as_str(),
                requested = new_status.as_str(),
                "Rejected transition out of terminal status"
            );
            return Err(OrderError::InvalidTransition(order.status));
        }

        let old_status = order.status;
        order.status = new_status;
        order.updated_at = Utc::now();

        let order = self.store.save(order).await?;

        tracing::info!(
            order_id = %order.id,
            old_status = old_status.as_str(),
            new_status = new_status.as_str(),
            "Order status updated"
        );
        self.metrics
            .record_status_transition(old_status.as_str(), new_status.as_str());

        self.publisher
            .publish(&OrderLifecycleEvent::status_changed(&order, old_status));

        Ok(order)
    }

    /* ---------- Cancel ---------- */

    /// Cancellation is terminal and deliberately not idempotent: a second
    /// cancel attempt is an error, not a no-op.
    pub async fn cancel(&self, order_id: Uuid) -> Result<Order, OrderError> {
        let mut order = self
            .store
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.status.is_terminal() {
            tracing::warn!(
                order_id = %order_id,
                status = order.status.as_str(),
                "Rejected cancel attempt"
            );
            return Err(OrderError::InvalidTransition(order.status));
        }

        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();

        let order = self.store.save(order).await?;

        tracing::info!(order_id = %order.id, "Order cancelled");
        self.metrics.record_order_cancelled();

        self.publisher.publish(&OrderLifecycleEvent::cancelled(&order));

        Ok(order)
    }

    /* ---------- Validation ---------- */

    fn validate(&self, request: &CreateOrderRequest) -> Result<(), OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        for item in &request.items {
            if !(1..=50).contains(&item.quantity) {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }
        if request.delivery_address.trim().is_empty() {
            return Err(OrderError::MissingField("delivery_address"));
        }
        if request.contact_phone.trim().is_empty() {
            return Err(OrderError::MissingField("contact_phone"));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
