use uuid::Uuid;

use super::model::OrderStatus;
use crate::store::StoreError;

// ============================================================================
// Order Lifecycle Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order items cannot be empty")]
    EmptyItems,

    #[error("invalid item quantity: {0} (allowed range is 1-50)")]
    InvalidQuantity(u32),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("no price known for menu item {0}")]
    UnknownMenuItem(u64),

    #[error("order not found: {0}")]
    NotFound(Uuid),

    #[error("cannot transition out of terminal status {0:?}")]
    InvalidTransition(OrderStatus),

    #[error("order store failure: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Malformed-request errors, as opposed to lookup or persistence failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrderError::EmptyItems
                | OrderError::InvalidQuantity(_)
                | OrderError::MissingField(_)
                | OrderError::UnknownMenuItem(_)
        )
    }
}
