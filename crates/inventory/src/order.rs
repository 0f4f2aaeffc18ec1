use stockroom_core::{DomainError, DomainResult, ProductId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    /// Demand side: units leave the stockroom. Bounded below by zero.
    User,
    /// Supply side: units arrive. No upper bound.
    Supplier,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::User => "user",
            OrderKind::Supplier => "supplier",
        }
    }
}

impl core::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-product order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockOrder {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl StockOrder {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Compute the stock level after applying an order of `quantity` units.
///
/// User orders that would take stock below zero fail with
/// `InsufficientStock`; the caller must leave the record untouched.
pub fn apply_order(kind: OrderKind, current_stock: i64, quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity", "must be greater than 0"));
    }

    match kind {
        OrderKind::User => {
            if quantity > current_stock {
                return Err(DomainError::insufficient_stock(current_stock, quantity));
            }
            Ok(current_stock - quantity)
        }
        OrderKind::Supplier => current_stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity", "stock level would overflow")),
    }
}
