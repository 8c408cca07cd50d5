//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    products::{Product, ProductError, ProductKey},
    promotions::{
        Promotion, PromotionError, PromotionKind, positional_discount::PositionalDiscount,
    },
    receipt::{Receipt, ReceiptError, ReceiptLine},
    store::{OrderLine, Store, StoreError},
};
