//! Storefront
//!
//! Storefront is a small retail inventory core: products with stock and an optional
//! promotion, a store that keeps them in order, and a fail-fast order flow.

pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod store;
