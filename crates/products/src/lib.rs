//! Products domain module.
//!
//! This crate contains the product record and its field rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    Category, NewProduct, Product, ProductPatch, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
    MAX_SUPPLIERS_LEN,
};
