//! Fixtures
//!
//! Seed a [`Store`] from YAML files. A fixture set `name` is read from
//! `<base>/promotions/<name>.yml` and `<base>/products/<name>.yml`; products
//! refer to promotions by key, and orders refer to products by key.

use std::{fs, path::PathBuf, rc::Rc};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    fixtures::{products::ProductsFixture, promotions::PromotionsFixture},
    products::{Product, ProductError, ProductKey},
    promotions::{Promotion, PromotionError},
    store::{OrderLine, Store, StoreError},
};

pub mod products;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between a product and the store
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product key defined twice
    #[error("Duplicate product key: {0}")]
    DuplicateProduct(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotion(#[from] PromotionError),

    /// Invalid product data
    #[error("Invalid product data: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Store rejected a product
    #[error("Failed to stock store: {0}")]
    Store(#[from] StoreError),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Stocked store, created when the first products are loaded
    store: Option<Store<'static>>,

    /// String key -> product key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,

    /// String key -> shared promotion
    promotions: FxHashMap<String, Rc<Promotion>>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            store: None,
            product_keys: FxHashMap::default(),
            promotions: FxHashMap::default(),
        }
    }

    /// Load promotions from `<base>/promotions/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a promotion is invalid.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;

        self.add_promotions_yaml(&contents)
    }

    /// Load products from `<base>/products/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a product is
    /// invalid, references an unknown promotion, or uses another currency.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.add_products_yaml(&contents)
    }

    /// Add promotions from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or a promotion is invalid.
    pub fn add_promotions_yaml(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = serde_norway::from_str(yaml)?;

        for (key, promotion_fixture) in fixture.promotions {
            let promotion = Promotion::try_from(promotion_fixture)?;

            self.promotions.insert(key, Rc::new(promotion));
        }

        Ok(self)
    }

    /// Add products from a YAML document, in document order.
    ///
    /// The whole document is validated before anything is stocked, so a
    /// failing document leaves the fixture unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a product is invalid,
    /// references an unknown promotion, reuses a key, or uses another currency.
    pub fn add_products_yaml(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(yaml)?;
        let currency = products::parse_currency(&fixture.currency)?;

        if let Some(store) = &self.store
            && store.currency() != currency
        {
            return Err(FixtureError::CurrencyMismatch(
                store.currency().iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }

        let mut staged: Vec<(String, Product<'static>)> =
            Vec::with_capacity(fixture.products.len());

        for product_fixture in fixture.products {
            if self.product_keys.contains_key(&product_fixture.key)
                || staged.iter().any(|(key, _)| *key == product_fixture.key)
            {
                return Err(FixtureError::DuplicateProduct(product_fixture.key));
            }

            let (minor_units, price_currency) = products::parse_price(&product_fixture.price)?;

            if price_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    price_currency.iso_alpha_code.to_string(),
                ));
            }

            let mut product = Product::new(
                product_fixture.name,
                Money::from_minor(minor_units, price_currency),
                product_fixture.quantity,
            )?;

            if let Some(promotion_key) = product_fixture.promotion {
                let promotion = self
                    .promotions
                    .get(&promotion_key)
                    .ok_or(FixtureError::PromotionNotFound(promotion_key))?;

                product = product.with_promotion(Rc::clone(promotion));
            }

            staged.push((product_fixture.key, product));
        }

        let store = self.store.get_or_insert_with(|| Store::new(currency));

        for (key, product) in staged {
            let product_key = store.add(product)?;

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load a complete fixture set (promotions, then products with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_promotions(name)?.load_products(name)?;

        Ok(fixture)
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a shared promotion by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, key: &str) -> Result<Rc<Promotion>, FixtureError> {
        self.promotions
            .get(key)
            .cloned()
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Resolve `(product key, quantity)` pairs into order lines.
    ///
    /// # Errors
    ///
    /// Returns an error if any product key is unknown.
    pub fn order_lines<'k>(
        &self,
        lines: impl IntoIterator<Item = (&'k str, u32)>,
    ) -> Result<Vec<OrderLine>, FixtureError> {
        lines
            .into_iter()
            .map(|(key, quantity)| Ok(OrderLine::new(self.product_key(key)?, quantity)))
            .collect()
    }

    /// The fixture currency, once products are loaded
    ///
    /// # Errors
    ///
    /// Returns an error if no products were loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.store
            .as_ref()
            .map(Store::currency)
            .ok_or(FixtureError::NoCurrency)
    }

    /// The stocked store
    ///
    /// # Errors
    ///
    /// Returns an error if no products were loaded.
    pub fn store(&self) -> Result<&Store<'static>, FixtureError> {
        self.store.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// The stocked store, for placing orders
    ///
    /// # Errors
    ///
    /// Returns an error if no products were loaded.
    pub fn store_mut(&mut self) -> Result<&mut Store<'static>, FixtureError> {
        self.store.as_mut().ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
