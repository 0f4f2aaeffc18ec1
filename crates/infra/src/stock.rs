//! Stock adjustment service: user orders take stock out, supplier orders bring it in.

use tracing::instrument;

use stockroom_core::DomainError;
use stockroom_inventory::{OrderKind, StockOrder};

use crate::error::StoreError;
use crate::product_store::ProductStore;

/// Applies orders to a product's stock through a `ProductStore`.
///
/// Each order is one atomic store call; a refused order leaves the record as it
/// was.
#[derive(Debug, Clone)]
pub struct StockAdjustmentService<S> {
    store: S,
}

impl<S> StockAdjustmentService<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Take `order.quantity` units out of stock. Returns the new stock level.
    pub async fn process_user_order(&self, order: StockOrder) -> Result<i64, StoreError> {
        self.process(OrderKind::User, order).await
    }

    /// Bring `order.quantity` units into stock. Returns the new stock level.
    pub async fn process_supplier_order(&self, order: StockOrder) -> Result<i64, StoreError> {
        self.process(OrderKind::Supplier, order).await
    }

    #[instrument(
        skip(self, order),
        fields(product_id = %order.product_id, quantity = order.quantity),
        err
    )]
    async fn process(&self, kind: OrderKind, order: StockOrder) -> Result<i64, StoreError> {
        order.validate()?;

        match self
            .store
            .adjust_stock(order.product_id, kind, order.quantity)
            .await
        {
            Ok(new_stock) => {
                tracing::info!(new_stock, "stock adjusted");
                Ok(new_stock)
            }
            Err(
                err @ StoreError::Domain(DomainError::InsufficientStock {
                    available,
                    requested,
                }),
            ) => {
                tracing::warn!(available, requested, "order refused: insufficient stock");
                Err(err)
            }
            Err(e) => Err(e),
        }
    }
}
