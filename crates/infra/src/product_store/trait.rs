use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::ProductId;
use stockroom_inventory::OrderKind;
use stockroom_products::{NewProduct, Product, ProductPatch};

use crate::error::StoreError;

/// Durable home of product records.
///
/// Implementations persist what they are given: field validation happens
/// upstream (`ProductCatalog`). The one rule a store must enforce itself is the
/// stock rule in `adjust_stock`, because only the store can make the
/// check-and-write atomic.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - assign ids that are unique and never reused
/// - return `DomainError::NotFound` (wrapped in `StoreError::Domain`) for a
///   missing id on `get`, `update`, `delete` and `adjust_stock`
/// - list in ascending id order
/// - apply `adjust_stock` atomically with respect to concurrent adjustments
///   of the same product, leaving the record untouched on failure
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new (validated) product and return the stored record.
    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Up to `limit` records after skipping `offset`, in id order. Both are non-negative.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError>;

    /// Apply the supplied fields of a (validated) patch and refresh `updated_at`.
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError>;

    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;

    /// Atomically apply an order to the product's stock and return the new level.
    async fn adjust_stock(
        &self,
        id: ProductId,
        kind: OrderKind,
        quantity: i64,
    ) -> Result<i64, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        (**self).insert(fields).await
    }

    async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        (**self).list(offset, limit).await
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn adjust_stock(
        &self,
        id: ProductId,
        kind: OrderKind,
        quantity: i64,
    ) -> Result<i64, StoreError> {
        (**self).adjust_stock(id, kind, quantity).await
    }
}
