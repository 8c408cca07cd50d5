//! Integration tests for stocking a store from YAML fixture sets.

use std::fs;

use rusty_money::{Money, iso::EUR};
use storefront::prelude::*;
use tempfile::TempDir;
use testresult::TestResult;

fn write_set(dir: &TempDir, name: &str, promotions: &str, products: &str) -> TestResult {
    fs::create_dir_all(dir.path().join("promotions"))?;
    fs::create_dir_all(dir.path().join("products"))?;

    fs::write(
        dir.path().join("promotions").join(format!("{name}.yml")),
        promotions,
    )?;
    fs::write(
        dir.path().join("products").join(format!("{name}.yml")),
        products,
    )?;

    Ok(())
}

#[test]
fn best_buy_set_stocks_the_store() -> TestResult {
    let fixture = Fixture::from_set("best_buy")?;
    let store = fixture.store()?;

    let active: Vec<&str> = store
        .active_products()
        .map(|(_, product)| product.name())
        .collect();

    assert_eq!(
        active,
        ["MacBook Air M2", "Bose QuietComfort Earbuds", "Google Pixel 7"]
    );
    assert_eq!(store.len(), 4);
    assert_eq!(store.total_quantity(), 850);

    let cable = store
        .get(fixture.product_key("cable")?)
        .ok_or("cable missing")?;

    assert!(!cable.is_active());
    assert_eq!(cable.promotion().map(|promotion| promotion.name()), Some("3 for 2"));

    Ok(())
}

#[test]
fn best_buy_set_orders_with_promotions() -> TestResult {
    let mut fixture = Fixture::from_set("best_buy")?;
    let lines = fixture.order_lines([("macbook", 2), ("earbuds", 3), ("pixel", 1)])?;

    let receipt = fixture.store_mut()?.checkout(lines)?;

    assert_eq!(receipt.total(), Money::from_minor(302_500, EUR));
    assert_eq!(receipt.subtotal(), Money::from_minor(415_000, EUR));

    Ok(())
}

#[test]
fn sets_load_from_a_custom_base_path() -> TestResult {
    let dir = TempDir::new()?;

    write_set(
        &dir,
        "corner_shop",
        r#"
promotions:
  three_for_two:
    type: positional
    name: "3 for 2"
    size: 3
    positions: [2]
    discount: "1.0"
"#,
        r#"
currency: GBP
products:
  - key: crisps
    name: Crisps
    price: "1.20 GBP"
    quantity: 30
    promotion: three_for_two
"#,
    )?;

    let mut fixture = Fixture::with_base_path(dir.path());

    fixture
        .load_promotions("corner_shop")?
        .load_products("corner_shop")?;

    let lines = fixture.order_lines([("crisps", 7)])?;
    let total = fixture.store_mut()?.order(lines)?;

    // 7 bags, 2 of them free
    assert_eq!(total.to_minor_units(), 600);
    assert_eq!(total.currency().iso_alpha_code, "GBP");

    Ok(())
}

#[test]
fn missing_set_is_an_io_error() -> TestResult {
    let dir = TempDir::new()?;

    let mut fixture = Fixture::with_base_path(dir.path());

    assert!(matches!(
        fixture.load_products("nothing_here"),
        Err(FixtureError::Io(_))
    ));

    Ok(())
}

#[test]
fn malformed_yaml_is_rejected() -> TestResult {
    let dir = TempDir::new()?;

    write_set(
        &dir,
        "broken",
        "promotions: {}\n",
        "currency: EUR\nproducts:\n  - key: [unterminated\n",
    )?;

    let mut fixture = Fixture::with_base_path(dir.path());

    fixture.load_promotions("broken")?;

    assert!(matches!(
        fixture.load_products("broken"),
        Err(FixtureError::Yaml(_))
    ));

    Ok(())
}

#[test]
fn invalid_product_data_is_rejected() -> TestResult {
    let dir = TempDir::new()?;

    write_set(
        &dir,
        "nameless",
        "promotions: {}\n",
        r#"
currency: EUR
products:
  - key: blank
    name: ""
    price: "1 EUR"
    quantity: 1
"#,
    )?;

    let mut fixture = Fixture::with_base_path(dir.path());

    fixture.load_promotions("nameless")?;

    assert!(matches!(
        fixture.load_products("nameless"),
        Err(FixtureError::InvalidProduct(ProductError::InvalidName))
    ));

    Ok(())
}
