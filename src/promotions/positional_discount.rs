//! Positional Discount
//!
//! Promotions that discount specific positions within fixed-size bundles of
//! units. This category covers BOGOF (2-for-1), second item half price,
//! 3-for-2 and similar X-for-Y offers.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{discounts::line_total_minor, promotions::PromotionError};

/// A Positional Discount
///
/// Units are grouped into bundles of `size`. Every unit whose zero-based
/// position inside its bundle is listed in `positions` gets `discount` taken
/// off. A trailing partial bundle is discounted too, as long as the position
/// exists in it.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalDiscount {
    size: u16,
    positions: SmallVec<[u16; 5]>,
    discount: Percentage,
}

impl PositionalDiscount {
    /// Create a new positional discount.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidConfig`] if the bundle size is zero,
    /// a position falls outside the bundle, a position is repeated, or the
    /// discount isn't between 0% and 100%.
    pub fn new(
        size: u16,
        positions: SmallVec<[u16; 5]>,
        discount: Percentage,
    ) -> Result<Self, PromotionError> {
        if size == 0 {
            return Err(PromotionError::InvalidConfig(
                "bundle size must be at least 1".to_string(),
            ));
        }

        if let Some(position) = positions.iter().find(|&&position| position >= size) {
            return Err(PromotionError::InvalidConfig(format!(
                "position {position} is outside a bundle of {size}"
            )));
        }

        let mut seen = positions.clone();
        seen.sort_unstable();
        seen.dedup();

        if seen.len() != positions.len() {
            return Err(PromotionError::InvalidConfig(
                "bundle positions must be unique".to_string(),
            ));
        }

        let fraction = discount * Decimal::ONE;

        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(PromotionError::InvalidConfig(format!(
                "discount {fraction} is not a fraction between 0 and 1"
            )));
        }

        Ok(Self {
            size,
            positions,
            discount,
        })
    }

    /// Return the bundle size
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Return the discounted positions
    pub fn positions(&self) -> &[u16] {
        &self.positions
    }

    /// Return the discount applied at each position
    pub fn discount(&self) -> Percentage {
        self.discount
    }

    /// Number of units out of `quantity` that land on a discounted position.
    pub fn discounted_units(&self, quantity: u32) -> u32 {
        let size = u32::from(self.size);
        let full_bundles = quantity / size;
        let remainder = quantity % size;

        self.positions
            .iter()
            .map(|&position| full_bundles + u32::from(u32::from(position) < remainder))
            .sum()
    }

    /// Total for `quantity` units at `unit_minor`, in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::PriceConversion`] if the total can't be represented.
    pub fn total_minor(&self, unit_minor: i64, quantity: u32) -> Result<i64, PromotionError> {
        let discounted = self.discounted_units(quantity);
        let full = quantity.saturating_sub(discounted);

        line_total_minor(unit_minor, full, discounted, &self.discount)
            .map_err(PromotionError::from)
    }
}
