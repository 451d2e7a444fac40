use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, StoreError};
use crate::domain::order::{Order, OrderStatus};

// ============================================================================
// In-Memory Order Store
// ============================================================================

/// HashMap-backed store guarded by a read-write lock. The write lock makes
/// each `save` an atomic read-modify-write over a single record, which is all
/// the lifecycle engine relies on. No persistence across restarts.
pub struct InMemoryOrderStore {
    records: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save(&self, mut order: Order) -> Result<Order, StoreError> {
        let mut records = self.records.write().await;

        if order.id.is_nil() {
            order.id = Uuid::new_v4();
        } else if !records.contains_key(&order.id) {
            return Err(StoreError::MissingRecord(order.id));
        }

        records.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_customer(&self, customer_id: u64) -> Result<Vec<Order>, StoreError> {
        self.filter(|o| o.customer_id == customer_id).await
    }

    async fn find_by_restaurant(&self, restaurant_id: u64) -> Result<Vec<Order>, StoreError> {
        self.filter(|o| o.restaurant_id == restaurant_id).await
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
        self.filter(move |o| o.status == status).await
    }
}

impl InMemoryOrderStore {
    async fn filter<F>(&self, predicate: F) -> Result<Vec<Order>, StoreError>
    where
        F: Fn(&Order) -> bool,
    {
        let records = self.records.read().await;
        let mut matches: Vec<Order> = records.values().filter(|o| predicate(o)).cloned().collect();
        matches.sort_by_key(|o| o.created_at);
        Ok(matches)
    }
}
