//! Infrastructure layer: product persistence and the services built on it.

pub mod catalog;
pub mod error;
pub mod product_store;
pub mod stock;


pub use catalog::ProductCatalog;
pub use error::StoreError;
pub use product_store::{InMemoryProductStore, ProductStore, SqliteProductStore};
pub use stock::StockAdjustmentService;
