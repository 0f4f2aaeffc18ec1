//! Product persistence boundary.
//!
//! This module defines the storage abstraction for product records and its two
//! backends: an in-memory map for tests/dev and a SQLite table for production.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use r#trait::ProductStore;
pub use sqlite::SqliteProductStore;
