// ============================================================================
// Order Domain - Order Aggregate, Lifecycle Events, and Errors
// ============================================================================
//
// This module contains ALL order-specific domain code:
// - Model (Order, OrderItem, OrderStatus)
// - Creation request (CreateOrderRequest)
// - Lifecycle events (OrderCreated, OrderStatusChanged, OrderCancelled)
// - Errors (OrderError enum)
//
// The lifecycle engine that drives these types lives in crate::service.
//
// ============================================================================

pub mod errors;
pub mod events;
pub mod model;
pub mod request;

// Re-export for convenience
pub use errors::*;
pub use events::*;
pub use model::*;
pub use request::*;
