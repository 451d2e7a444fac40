use rust_decimal::Decimal;

// ============================================================================
// Price Catalog - Unit price lookup for menu items
// ============================================================================

/// Unit-price sourcing is a catalog concern; the lifecycle engine only owns
/// the arithmetic (total = unit price x quantity).
pub trait PriceCatalog: Send + Sync {
    /// `None` means the menu item is unknown to the catalog.
    fn unit_price(&self, menu_item_id: u64) -> Option<Decimal>;
}

/// Catalog that prices every menu item at one flat rate. Stands in for a real
/// menu service in development and tests.
pub struct FlatRateCatalog {
    price: Decimal,
}

impl FlatRateCatalog {
    pub fn new(price: Decimal) -> Self {
        Self { price }
    }
}

impl Default for FlatRateCatalog {
    fn default() -> Self {
        // 10.00 per item
        Self::new(Decimal::new(1000, 2))
    }
}

impl PriceCatalog for FlatRateCatalog {
    fn unit_price(&self, _menu_item_id: u64) -> Option<Decimal> {
        Some(self.price)
    }
}
