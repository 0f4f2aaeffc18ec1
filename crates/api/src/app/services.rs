use std::sync::Arc;

use stockroom_infra::{
    InMemoryProductStore, ProductCatalog, ProductStore, SqliteProductStore,
    StockAdjustmentService, StoreError,
};

use crate::config::ApiConfig;

/// Shared store handle used by every service.
pub type SharedStore = Arc<dyn ProductStore>;

/// Services shared by all handlers (injected via `Extension<Arc<AppServices>>`).
#[derive(Clone)]
pub struct AppServices {
    pub catalog: ProductCatalog<SharedStore>,
    pub stock: StockAdjustmentService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: ProductCatalog::new(store.clone()),
            stock: StockAdjustmentService::new(store),
        }
    }

    /// Process-local store; contents are lost on restart.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()))
    }

    /// Pick the store backend from configuration and prepare it for use.
    pub async fn from_config(config: &ApiConfig) -> Result<Self, StoreError> {
        if !config.use_persistent_stores {
            tracing::warn!("USE_PERSISTENT_STORES=false; products are kept in memory only");
            return Ok(Self::in_memory());
        }

        let store =
            SqliteProductStore::connect(&config.database_url, config.database_max_connections)
                .await?;
        tracing::info!(database_url = %config.database_url, "sqlite product store ready");
        Ok(Self::new(Arc::new(store)))
    }
}
