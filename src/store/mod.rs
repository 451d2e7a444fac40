use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};

mod memory;

pub use memory::InMemoryOrderStore;

// ============================================================================
// Order Store - Durable keyed storage for order records
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot update order {0}: no such record")]
    MissingRecord(Uuid),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Durable storage contract consumed by the lifecycle engine. Implementations
/// must provide per-record atomicity for `save`; the engine performs no
/// locking of its own, so concurrent transitions on one order are resolved by
/// the store (last committed write wins — an accepted limitation).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert or whole-record update. A nil order id marks a first insert;
    /// the store assigns the definitive id and returns the persisted record.
    async fn save(&self, order: Order) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn find_by_customer(&self, customer_id: u64) -> Result<Vec<Order>, StoreError>;

    async fn find_by_restaurant(&self, restaurant_id: u64) -> Result<Vec<Order>, StoreError>;

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError>;
}
