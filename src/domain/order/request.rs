use serde::{Deserialize, Serialize};

// ============================================================================
// Order Creation Request
// ============================================================================

/// Validated upstream for transport-level shape; the lifecycle engine still
/// enforces the structural rules (non-empty items, quantity bounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: u64,
    pub restaurant_id: u64,
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: String,
    pub contact_phone: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub special_instructions: Option<String>,
}
