use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{DomainError, ProductId};
use stockroom_inventory::{OrderKind, StockOrder, apply_order};
use stockroom_products::{NewProduct, Product, ProductPatch};

use super::r#trait::ProductStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    products: BTreeMap<ProductId, Product>,
}

/// In-memory product store.
///
/// Intended for tests/dev. Every mutation runs under the write lock, which is
/// what makes stock adjustments atomic.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<Inner>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.write()?;
        inner.last_id += 1;
        let id = ProductId::new(inner.last_id);

        let product = Product::create(id, fields, Utc::now());
        inner.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        let inner = self.read()?;
        inner
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::Domain(DomainError::NotFound))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);

        let inner = self.read()?;
        Ok(inner
            .products
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        let mut inner = self.write()?;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;

        product.apply_patch(&patch, Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        match inner.products.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Domain(DomainError::NotFound)),
        }
    }

    async fn adjust_stock(
        &self,
        id: ProductId,
        kind: OrderKind,
        quantity: i64,
    ) -> Result<i64, StoreError> {
        StockOrder::new(id, quantity).validate()?;

        let mut inner = self.write()?;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StoreError::Domain(DomainError::NotFound))?;

        let new_stock = apply_order(kind, product.current_stock, quantity)?;
        product.set_stock(new_stock, Utc::now())?;
        Ok(new_stock)
    }
}
