//! Store
//!
//! An ordered collection of products plus the order flow that sells them.
//!
//! Orders are processed line by line and are **fail-fast without rollback**:
//! the first line that can't be bought aborts the rest of the order, and any
//! stock already taken by earlier lines stays taken. Callers that need
//! all-or-nothing behaviour must check every line (see
//! [`Product::check_available`] and [`Product::quote`]) before ordering.

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{Span, debug, warn};

use crate::{
    products::{Product, ProductError, ProductKey},
    receipt::{Receipt, ReceiptLine},
};

/// Errors raised by store membership changes and orders.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// The product key isn't a member of the store.
    #[error("product {0:?} is not in the store")]
    NotFound(ProductKey),

    /// A product's currency differs from the store currency (product currency, store currency).
    #[error("product has currency {0}, but store has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An order line failed; earlier lines remain committed.
    #[error("order line {index} failed: {source}")]
    Line {
        /// Position of the failing line in the order
        index: usize,
        /// Product the line referred to
        product: ProductKey,
        /// Why the purchase failed
        #[source]
        source: ProductError,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One requested line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to buy
    pub product: ProductKey,

    /// Units to buy
    pub quantity: u32,
}

impl OrderLine {
    /// Create a new order line.
    pub fn new(product: ProductKey, quantity: u32) -> Self {
        Self { product, quantity }
    }
}

impl From<(ProductKey, u32)> for OrderLine {
    fn from((product, quantity): (ProductKey, u32)) -> Self {
        Self::new(product, quantity)
    }
}

/// Store
#[derive(Debug)]
pub struct Store<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    shelf: Vec<ProductKey>,
    currency: &'static Currency,
}

impl<'a> Store<'a> {
    /// Create an empty store trading in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Store {
            products: SlotMap::with_key(),
            shelf: Vec::new(),
            currency,
        }
    }

    /// Create a store stocked with `products`, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CurrencyMismatch`] if any product is priced in
    /// another currency.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, StoreError> {
        let mut store = Store::new(currency);

        for product in products {
            store.add(product)?;
        }

        Ok(store)
    }

    /// Add a product to the end of the shelf, returning its key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CurrencyMismatch`] if the product is priced in
    /// another currency.
    pub fn add(&mut self, product: Product<'a>) -> Result<ProductKey, StoreError> {
        let product_currency = product.price().currency();

        if product_currency != self.currency {
            return Err(StoreError::CurrencyMismatch(
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let key = self.products.insert(product);
        self.shelf.push(key);

        Ok(key)
    }

    /// Remove a product, handing it back to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key isn't a member.
    pub fn remove(&mut self, key: ProductKey) -> Result<Product<'a>, StoreError> {
        let product = self.products.remove(key).ok_or(StoreError::NotFound(key))?;

        self.shelf.retain(|&shelved| shelved != key);

        Ok(product)
    }

    /// Look up a product.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Look up a product for modification (restocking, promotions).
    pub fn get_mut(&mut self, key: ProductKey) -> Option<&mut Product<'a>> {
        self.products.get_mut(key)
    }

    /// Whether `key` is a member of the store.
    pub fn contains(&self, key: ProductKey) -> bool {
        self.products.contains_key(key)
    }

    /// Number of products, active or not.
    pub fn len(&self) -> usize {
        self.shelf.len()
    }

    /// Whether the store has no products.
    pub fn is_empty(&self) -> bool {
        self.shelf.is_empty()
    }

    /// The store currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// All products in shelf order, active or not.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> + '_ {
        self.shelf
            .iter()
            .filter_map(|&key| self.products.get(key).map(|product| (key, product)))
    }

    /// Active products in shelf order.
    ///
    /// The iterator is lazy and re-evaluated on every call, so it always
    /// reflects the current stock.
    pub fn active_products(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> + '_ {
        self.iter().filter(|(_, product)| product.is_active())
    }

    /// Sum of stock across every product, including inactive ones.
    pub fn total_quantity(&self) -> u64 {
        self.products
            .values()
            .map(|product| u64::from(product.quantity()))
            .sum()
    }

    /// Process an order and return its total price.
    ///
    /// See [`Store::checkout`] for the line-by-line semantics.
    ///
    /// # Errors
    ///
    /// Returns the first line failure; earlier lines stay committed.
    pub fn order<I, L>(&mut self, lines: I) -> Result<Money<'a, Currency>, StoreError>
    where
        I: IntoIterator<Item = L>,
        L: Into<OrderLine>,
    {
        self.checkout(lines).map(|receipt| Receipt::total(&receipt))
    }

    /// Process an order and return an itemised receipt.
    ///
    /// Lines are bought in sequence. The first failure stops the order and is
    /// returned; stock taken by the lines before it is **not** restored. Every
    /// call starts from an empty total.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`]: a line refers to a product that isn't in the store.
    /// - [`StoreError::Line`]: a line couldn't be bought.
    /// - [`StoreError::Money`]: the running total couldn't be updated.
    #[tracing::instrument(
        name = "store.checkout",
        skip_all,
        fields(
            line_count = tracing::field::Empty,
            total_minor = tracing::field::Empty
        )
    )]
    pub fn checkout<I, L>(&mut self, lines: I) -> Result<Receipt<'a>, StoreError>
    where
        I: IntoIterator<Item = L>,
        L: Into<OrderLine>,
    {
        let mut receipt_lines: SmallVec<[ReceiptLine<'a>; 10]> = SmallVec::new();
        let mut subtotal = Money::from_minor(0, self.currency);
        let mut total = Money::from_minor(0, self.currency);

        for (index, line) in lines.into_iter().map(Into::into).enumerate() {
            let receipt_line = self
                .buy_line(index, line)
                .inspect_err(|err| log_aborted_order(index, err))?;

            subtotal = subtotal.add(receipt_line.base_price())?;
            total = total.add(receipt_line.final_price())?;

            receipt_lines.push(receipt_line);
        }

        let span = Span::current();
        span.record("line_count", receipt_lines.len());
        span.record("total_minor", total.to_minor_units());

        debug!(
            line_count = receipt_lines.len(),
            total_minor = total.to_minor_units(),
            "order completed"
        );

        Ok(Receipt::new(receipt_lines, subtotal, total, self.currency))
    }

    fn buy_line(&mut self, index: usize, line: OrderLine) -> Result<ReceiptLine<'a>, StoreError> {
        let product = self
            .products
            .get_mut(line.product)
            .ok_or(StoreError::NotFound(line.product))?;

        let line_error = |source| StoreError::Line {
            index,
            product: line.product,
            source,
        };

        product.check_available(line.quantity).map_err(line_error)?;

        let base_price = product.subtotal(line.quantity).map_err(line_error)?;
        let final_price = product.buy(line.quantity).map_err(line_error)?;

        Ok(ReceiptLine::new(
            line.product,
            product.name().to_string(),
            line.quantity,
            product.price(),
            base_price,
            final_price,
            product
                .promotion()
                .map(|promotion| promotion.name().to_string()),
        ))
    }
}

fn log_aborted_order(index: usize, err: &StoreError) {
    if index > 0 {
        warn!(
            failed_line = index,
            committed_lines = index,
            error = %err,
            "order aborted; earlier lines remain committed"
        );
    } else {
        debug!(error = %err, "order rejected at first line");
    }
}
