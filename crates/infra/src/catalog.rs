//! Product CRUD with boundary validation.

use tracing::instrument;

use stockroom_core::{ProductId, ValidationErrors};
use stockroom_products::{NewProduct, Product, ProductPatch};

use crate::error::StoreError;
use crate::product_store::ProductStore;

/// Validating front door to a `ProductStore`.
///
/// Input is checked before the store is touched, so a rejected request never
/// reaches persistence.
#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    pub async fn create(&self, input: NewProduct) -> Result<Product, StoreError> {
        input.validate()?;
        let product = self.store.insert(input).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        self.store.get(id).await
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let mut errors = ValidationErrors::new();
        if offset < 0 {
            errors.push("skip", "must be greater than or equal to 0");
        }
        if limit < 0 {
            errors.push("limit", "must be greater than or equal to 0");
        }
        errors.into_result()?;

        self.store.list(offset, limit).await
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, StoreError> {
        patch.validate()?;
        let product = self.store.update(id, patch).await?;
        tracing::info!("product updated");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        tracing::info!("product deleted");
        Ok(())
    }
}
