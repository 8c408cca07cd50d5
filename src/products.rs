//! Products

use std::{fmt, rc::Rc};

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;
use tracing::debug;

use crate::promotions::{Promotion, PromotionError};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Errors raised by product construction, stock changes and purchases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Products must have a non-empty name.
    #[error("product name must not be empty")]
    InvalidName,

    /// Products can't be priced below zero.
    #[error("product price must not be negative, got {0} minor units")]
    InvalidPrice(i64),

    /// The requested quantity isn't a positive number of units.
    #[error("quantity must be a positive number of units")]
    InvalidQuantity,

    /// More units were requested than are in stock.
    #[error("not enough stock: requested {requested}, available {available}")]
    OutOfStock {
        /// Units requested
        requested: u32,
        /// Units in stock
        available: u32,
    },

    /// The undiscounted line price overflowed.
    #[error("line price overflowed")]
    PriceOverflow,

    /// The attached promotion could not price the line.
    #[error(transparent)]
    Promotion(#[from] PromotionError),
}

/// A stocked product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    name: String,
    price: Money<'a, Currency>,
    quantity: u32,
    active: bool,
    promotion: Option<Rc<Promotion>>,
}

impl<'a> Product<'a> {
    /// Create a new product with `quantity` units in stock.
    ///
    /// The product starts active when it has stock.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidName`] for an empty (or blank) name and
    /// [`ProductError::InvalidPrice`] for a negative price.
    pub fn new(
        name: impl Into<String>,
        price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, ProductError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(ProductError::InvalidName);
        }

        let minor = price.to_minor_units();

        if minor < 0 {
            return Err(ProductError::InvalidPrice(minor));
        }

        Ok(Self {
            name,
            price,
            quantity,
            active: quantity > 0,
            promotion: None,
        })
    }

    /// Attach `promotion` while building a product.
    #[must_use]
    pub fn with_promotion(mut self, promotion: Rc<Promotion>) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price
    pub fn price(&self) -> Money<'a, Currency> {
        self.price
    }

    /// Units in stock
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the product is available for purchase and listing
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The attached promotion, if any
    pub fn promotion(&self) -> Option<&Rc<Promotion>> {
        self.promotion.as_ref()
    }

    /// Replace the promotion (or clear it with `None`), returning the previous one.
    pub fn set_promotion(&mut self, promotion: Option<Rc<Promotion>>) -> Option<Rc<Promotion>> {
        std::mem::replace(&mut self.promotion, promotion)
    }

    /// Overwrite the stock level. Zero deactivates the product, anything else
    /// reactivates it.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.active = quantity > 0;
    }

    /// Add `quantity` units to stock and reactivate the product.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidQuantity`] for zero units or if the new
    /// stock level would overflow.
    pub fn restock(&mut self, quantity: u32) -> Result<(), ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity);
        }

        let restocked = self
            .quantity
            .checked_add(quantity)
            .ok_or(ProductError::InvalidQuantity)?;

        self.set_quantity(restocked);

        Ok(())
    }

    /// Activate the product. Only succeeds while there is stock.
    pub fn activate(&mut self) -> bool {
        if self.quantity > 0 {
            self.active = true;
        }

        self.active
    }

    /// Take the product off sale without touching its stock.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Undiscounted price of `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::PriceOverflow`] if the total doesn't fit in minor units.
    pub fn subtotal(&self, quantity: u32) -> Result<Money<'a, Currency>, ProductError> {
        let minor = self
            .price
            .to_minor_units()
            .checked_mul(i64::from(quantity))
            .ok_or(ProductError::PriceOverflow)?;

        Ok(Money::from_minor(minor, self.price.currency()))
    }

    /// Price of `quantity` units after the attached promotion, without
    /// touching stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the line can't be priced.
    pub fn quote(&self, quantity: u32) -> Result<Money<'a, Currency>, ProductError> {
        match &self.promotion {
            Some(promotion) => Ok(promotion.apply(self.price, quantity)?),
            None => self.subtotal(quantity),
        }
    }

    /// Check that `quantity` units could be bought right now, without
    /// touching stock.
    ///
    /// # Errors
    ///
    /// - [`ProductError::InvalidQuantity`]: `quantity` is zero.
    /// - [`ProductError::OutOfStock`]: `quantity` exceeds the stock level.
    pub fn check_available(&self, quantity: u32) -> Result<(), ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity);
        }

        if quantity > self.quantity {
            return Err(ProductError::OutOfStock {
                requested: quantity,
                available: self.quantity,
            });
        }

        Ok(())
    }

    /// Buy `quantity` units, removing them from stock and returning the line price.
    ///
    /// The stock change is committed before returning; nothing downstream can
    /// undo it. The product is deactivated when the last unit is sold.
    ///
    /// # Errors
    ///
    /// - [`ProductError::InvalidQuantity`]: `quantity` is zero.
    /// - [`ProductError::OutOfStock`]: `quantity` exceeds the stock level.
    /// - [`ProductError::PriceOverflow`] / [`ProductError::Promotion`]: the line
    ///   can't be priced. Stock is left untouched.
    pub fn buy(&mut self, quantity: u32) -> Result<Money<'a, Currency>, ProductError> {
        self.check_available(quantity)?;

        let price = self.quote(quantity)?;

        self.quantity -= quantity;

        if self.quantity == 0 {
            self.deactivate();
        }

        debug!(
            product = %self.name,
            quantity,
            remaining = self.quantity,
            price_minor = price.to_minor_units(),
            "bought product"
        );

        Ok(price)
    }
}

impl fmt::Display for Product<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Price: {}, Quantity: {}",
            self.name, self.price, self.quantity
        )?;

        if let Some(promotion) = &self.promotion {
            write!(f, ", Promotion: {promotion}")?;
        }

        Ok(())
    }
}
