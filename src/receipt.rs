//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::products::ProductKey;

/// Errors that can occur when summarising or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    product: ProductKey,
    name: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    base_price: Money<'a, Currency>,
    final_price: Money<'a, Currency>,
    promotion: Option<String>,
}

impl<'a> ReceiptLine<'a> {
    /// Create a new receipt line.
    pub fn new(
        product: ProductKey,
        name: String,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        base_price: Money<'a, Currency>,
        final_price: Money<'a, Currency>,
        promotion: Option<String>,
    ) -> Self {
        Self {
            product,
            name,
            quantity,
            unit_price,
            base_price,
            final_price,
            promotion,
        }
    }

    /// Product bought on this line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Product name at the time of purchase
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units bought
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price at the time of purchase
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Price of the line before any promotion
    pub fn base_price(&self) -> Money<'a, Currency> {
        self.base_price
    }

    /// Price paid for the line
    pub fn final_price(&self) -> Money<'a, Currency> {
        self.final_price
    }

    /// Name of the promotion applied to the line, if any
    pub fn promotion(&self) -> Option<&str> {
        self.promotion.as_deref()
    }

    /// Savings made on this line.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.base_price.sub(self.final_price)
    }
}

/// Final receipt for a processed order.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Purchased lines, in order
    lines: SmallVec<[ReceiptLine<'a>; 10]>,

    /// Total cost before any promotion applications
    subtotal: Money<'a, Currency>,

    /// Total amount paid after promotion applications
    total: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a new receipt with the given details.
    #[must_use]
    pub fn new(
        lines: SmallVec<[ReceiptLine<'a>; 10]>,
        subtotal: Money<'a, Currency>,
        total: Money<'a, Currency>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines,
            subtotal,
            total,
            currency,
        }
    }

    /// Purchased lines, in order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total cost before any promotion applications
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total amount paid
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the savings made by applying promotions.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Calculates the savings made by applying the promotions as a percentage
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Prints the receipt as a table followed by a totals summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Item",
            "Qty",
            "Unit Price",
            "Base Price",
            "Discounted Price",
            "Savings",
            "Promotion",
        ]);

        let mut discounted_rows: SmallVec<[usize; 10]> = SmallVec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            let discounted = line.final_price != line.base_price;

            let (final_price, savings) = if discounted {
                discounted_rows.push(idx + 1); // header is row 0
                (
                    format!("{}", line.final_price),
                    format!("-{}", line.savings()?),
                )
            } else {
                (String::new(), String::new())
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.base_price),
                final_price,
                savings,
                line.promotion.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..7), Alignment::right());

        for row in discounted_rows {
            table.modify((row, 5), Color::FG_GREEN);
        }

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let savings = self.savings()?;
        let savings_percent_points = percent_points(self.savings_percent()?);

        let rows = [
            ("Subtotal:", format!("{}", self.subtotal)),
            ("Total:", format!("{}", self.total)),
            (
                "Savings:",
                format!("({savings_percent_points:.2}%) {savings}"),
            ),
        ];

        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>9}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn gbp(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, iso::GBP)
    }

    fn line(name: &str, base: i64, paid: i64, promotion: Option<&str>) -> ReceiptLine<'static> {
        ReceiptLine::new(
            ProductKey::default(),
            name.to_string(),
            2,
            gbp(base / 2),
            gbp(base),
            gbp(paid),
            promotion.map(str::to_string),
        )
    }

    fn test_receipt() -> Receipt<'static> {
        Receipt::new(
            smallvec![
                line("MacBook Air M2", 290_000, 217_500, Some("Second Half price!")),
                line("Google Pixel 7", 100_000, 100_000, None),
            ],
            gbp(390_000),
            gbp(317_500),
            iso::GBP,
        )
    }

    #[test]
    fn accessors_return_values_from_constructor() {
        let receipt = test_receipt();

        assert_eq!(receipt.subtotal(), gbp(390_000));
        assert_eq!(receipt.total(), gbp(317_500));
        assert_eq!(receipt.currency(), iso::GBP);
        assert_eq!(receipt.lines().len(), 2);
    }

    #[test]
    fn line_accessors_and_savings() -> TestResult {
        let receipt = test_receipt();
        let first = receipt.lines().first().ok_or("missing line")?;

        assert_eq!(first.name(), "MacBook Air M2");
        assert_eq!(first.quantity(), 2);
        assert_eq!(first.unit_price(), gbp(145_000));
        assert_eq!(first.promotion(), Some("Second Half price!"));
        assert_eq!(first.savings()?, gbp(72_500));

        Ok(())
    }

    #[test]
    fn savings_is_subtotal_minus_total() -> TestResult {
        let receipt = test_receipt();

        assert_eq!(receipt.savings()?, gbp(72_500));

        Ok(())
    }

    #[test]
    fn savings_percent_is_relative_to_subtotal() -> TestResult {
        let receipt = Receipt::new(smallvec![], gbp(400), gbp(300), iso::GBP);

        assert_eq!(percent_points(receipt.savings_percent()?), Decimal::from(25));

        Ok(())
    }

    #[test]
    fn savings_percent_of_empty_receipt_is_zero() -> TestResult {
        let receipt = Receipt::new(smallvec![], gbp(0), gbp(0), iso::GBP);

        assert_eq!(percent_points(receipt.savings_percent()?), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn savings_errors_on_currency_mismatch() {
        let receipt = Receipt::new(
            smallvec![],
            gbp(300),
            Money::from_minor(250, iso::USD),
            iso::GBP,
        );

        assert_eq!(
            receipt.savings(),
            Err(MoneyError::CurrencyMismatch {
                expected: iso::GBP.iso_alpha_code,
                actual: iso::USD.iso_alpha_code,
            })
        );
    }

    #[test]
    fn write_to_lists_lines_and_totals() -> TestResult {
        let receipt = test_receipt();
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        let printed = String::from_utf8(out)?;

        assert!(printed.contains("MacBook Air M2"));
        assert!(printed.contains("Google Pixel 7"));
        assert!(printed.contains("Second Half price!"));
        assert!(printed.contains("Subtotal:"));
        assert!(printed.contains("Total:"));
        assert!(printed.contains("(18.59%)"));

        Ok(())
    }
}
