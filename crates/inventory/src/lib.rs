//! Inventory domain module.
//!
//! This crate contains the stock adjustment rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod order;

pub use order::{OrderKind, StockOrder, apply_order};
