//! Promotions
//!
//! Stateless pricing rules that turn a unit price and a quantity into the
//! discounted total for one order line. A promotion holds no per-order state,
//! so a single instance can be shared (via `Rc`) by any number of products.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, line_total_minor},
    promotions::positional_discount::PositionalDiscount,
};

pub mod positional_discount;

/// Errors raised while building or applying a promotion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// The promotion was constructed with out-of-range parameters.
    #[error("invalid promotion configuration: {0}")]
    InvalidConfig(String),

    /// The discounted total could not be represented in minor units.
    #[error("promotion price could not be represented in minor units")]
    PriceConversion,
}

impl From<DiscountError> for PromotionError {
    fn from(_err: DiscountError) -> Self {
        PromotionError::PriceConversion
    }
}

/// The pricing rule behind a promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind {
    /// Every second unit is half price; an unpaired unit is full price.
    SecondHalfPrice,

    /// Every third unit is free.
    BuyTwoGetOneFree,

    /// A flat percentage off every unit (stored as a fraction, e.g. 0.3 for 30%).
    PercentageOff(Percentage),

    /// An arbitrary X-for-Y style bundle discount.
    Positional(PositionalDiscount),
}

/// Second unit of every pair at 50% off.
fn second_half_price_bundle() -> Result<PositionalDiscount, PromotionError> {
    PositionalDiscount::new(2, smallvec![1], Percentage::from(Decimal::new(5, 1)))
}

/// Third unit of every three at 100% off.
fn buy_two_get_one_free_bundle() -> Result<PositionalDiscount, PromotionError> {
    PositionalDiscount::new(3, smallvec![2], Percentage::from(Decimal::ONE))
}

/// A named promotion that can be attached to products.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    name: String,
    kind: PromotionKind,
}

impl Promotion {
    /// Second unit of every pair at half price.
    pub fn second_half_price(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PromotionKind::SecondHalfPrice,
        }
    }

    /// Every third unit free.
    pub fn buy_two_get_one_free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PromotionKind::BuyTwoGetOneFree,
        }
    }

    /// A percentage off every unit. `rate` is given in percent points (`30` is 30% off).
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidConfig`] unless `rate` is between 0 and 100.
    pub fn percentage_off(name: impl Into<String>, rate: Decimal) -> Result<Self, PromotionError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
            return Err(PromotionError::InvalidConfig(format!(
                "percentage rate {rate} is outside 0..=100"
            )));
        }

        Ok(Self {
            name: name.into(),
            kind: PromotionKind::PercentageOff(Percentage::from(rate / Decimal::ONE_HUNDRED)),
        })
    }

    /// A bundle discount: `percent_off` percent off every listed position in
    /// each bundle of `size` units.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidConfig`] if the bundle or rate is invalid.
    pub fn positional(
        name: impl Into<String>,
        size: u16,
        positions: SmallVec<[u16; 5]>,
        percent_off: Decimal,
    ) -> Result<Self, PromotionError> {
        if percent_off < Decimal::ZERO || percent_off > Decimal::ONE_HUNDRED {
            return Err(PromotionError::InvalidConfig(format!(
                "percentage rate {percent_off} is outside 0..=100"
            )));
        }

        let discount = Percentage::from(percent_off / Decimal::ONE_HUNDRED);

        Ok(Self {
            name: name.into(),
            kind: PromotionKind::Positional(PositionalDiscount::new(size, positions, discount)?),
        })
    }

    /// Return the promotion name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the pricing rule
    pub fn kind(&self) -> &PromotionKind {
        &self.kind
    }

    /// Total for `quantity` units at `unit_price` after this promotion.
    ///
    /// The result is in the unit price's currency and is never negative for a
    /// non-negative unit price. A quantity of zero always costs nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::PriceConversion`] if the total overflows.
    pub fn apply<'a>(
        &self,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Money<'a, Currency>, PromotionError> {
        let unit_minor = unit_price.to_minor_units();

        let total_minor = match &self.kind {
            PromotionKind::SecondHalfPrice => {
                second_half_price_bundle()?.total_minor(unit_minor, quantity)?
            }
            PromotionKind::BuyTwoGetOneFree => {
                buy_two_get_one_free_bundle()?.total_minor(unit_minor, quantity)?
            }
            PromotionKind::PercentageOff(percent) => {
                line_total_minor(unit_minor, 0, quantity, percent)?
            }
            PromotionKind::Positional(positional) => positional.total_minor(unit_minor, quantity)?,
        };

        Ok(Money::from_minor(total_minor, unit_price.currency()))
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
