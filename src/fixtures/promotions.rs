//! Promotion Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{fixtures::FixtureError, promotions::Promotion};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Map of promotion key -> promotion fixture
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionFixture {
    /// Second unit of every pair half price
    SecondHalfPrice {
        /// Promotion name
        name: String,
    },

    /// Every third unit free
    BuyTwoGetOneFree {
        /// Promotion name
        name: String,
    },

    /// Percentage off every unit
    PercentageOff {
        /// Promotion name
        name: String,

        /// Rate, either "30%" or "0.3"
        rate: String,
    },

    /// X-for-Y bundle discount
    Positional {
        /// Promotion name
        name: String,

        /// Units per bundle
        size: u16,

        /// Zero-based discounted positions within each bundle
        positions: Vec<u16>,

        /// Discount at each position, either "50%" or "0.5"
        discount: String,
    },
}

impl TryFrom<PromotionFixture> for Promotion {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let promotion = match fixture {
            PromotionFixture::SecondHalfPrice { name } => Promotion::second_half_price(name),
            PromotionFixture::BuyTwoGetOneFree { name } => Promotion::buy_two_get_one_free(name),
            PromotionFixture::PercentageOff { name, rate } => {
                Promotion::percentage_off(name, parse_percentage(&rate)?)?
            }
            PromotionFixture::Positional {
                name,
                size,
                positions,
                discount,
            } => Promotion::positional(
                name,
                size,
                SmallVec::from_vec(positions),
                parse_percentage(&discount)?,
            )?,
        };

        Ok(promotion)
    }
}

/// Parse percentage string (e.g., "15%" or "0.15") into percent points (15)
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    } else {
        trimmed
            .parse::<Decimal>()
            .ok()
            .and_then(|fraction| fraction.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))
    }
}
