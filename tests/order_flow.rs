//! Integration tests for the store order flow.
//!
//! Store contents used throughout (EUR):
//!
//! - MacBook Air M2: €1450.00, 100 in stock, second unit of each pair half price
//! - Bose QuietComfort Earbuds: €250.00, 500 in stock, every third unit free
//! - Google Pixel 7: €500.00, 250 in stock, 30% off
//!
//! Ordering 2 MacBooks, 3 earbuds and 1 Pixel costs
//! €1450 + €725 + €500 + €350 = €3025.00.

use std::rc::Rc;

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR},
};
use storefront::prelude::*;
use testresult::TestResult;

struct BestBuy {
    store: Store<'static>,
    macbook: ProductKey,
    earbuds: ProductKey,
    pixel: ProductKey,
}

fn eur(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, EUR)
}

fn best_buy() -> TestResult<BestBuy> {
    let mut store = Store::new(EUR);

    let macbook = store.add(
        Product::new("MacBook Air M2", eur(145_000), 100)?
            .with_promotion(Rc::new(Promotion::second_half_price("Second Half price!"))),
    )?;

    let earbuds = store.add(
        Product::new("Bose QuietComfort Earbuds", eur(25_000), 500)?
            .with_promotion(Rc::new(Promotion::buy_two_get_one_free("Third One Free!"))),
    )?;

    let pixel = store.add(
        Product::new("Google Pixel 7", eur(50_000), 250)?.with_promotion(Rc::new(
            Promotion::percentage_off("30% off!", Decimal::from(30))?,
        )),
    )?;

    Ok(BestBuy {
        store,
        macbook,
        earbuds,
        pixel,
    })
}

#[test]
fn order_applies_each_products_promotion() -> TestResult {
    let BestBuy {
        mut store,
        macbook,
        earbuds,
        pixel,
    } = best_buy()?;

    let total = store.order([(macbook, 2), (earbuds, 3), (pixel, 1)])?;

    assert_eq!(total, eur(302_500));
    assert_eq!(store.total_quantity(), 850 - 6);

    Ok(())
}

#[test]
fn identical_consecutive_orders_cost_the_same() -> TestResult {
    let BestBuy {
        mut store,
        macbook,
        earbuds,
        ..
    } = best_buy()?;

    let first = store.order([(macbook, 1), (earbuds, 2)])?;
    let second = store.order([(macbook, 1), (earbuds, 2)])?;

    assert_eq!(first, second);
    assert_eq!(first, eur(195_000));

    Ok(())
}

#[test]
fn failed_line_aborts_order_but_keeps_earlier_lines() -> TestResult {
    let BestBuy {
        mut store,
        macbook,
        pixel,
        ..
    } = best_buy()?;

    let result = store.order([(macbook, 2), (pixel, 251), (macbook, 1)]);

    assert_eq!(
        result,
        Err(StoreError::Line {
            index: 1,
            product: pixel,
            source: ProductError::OutOfStock {
                requested: 251,
                available: 250,
            },
        })
    );

    let macbook = store.get(macbook).ok_or("macbook missing")?;
    let pixel = store.get(pixel).ok_or("pixel missing")?;

    assert_eq!(macbook.quantity(), 98);
    assert_eq!(pixel.quantity(), 250);

    Ok(())
}

#[test]
fn sold_out_products_leave_active_products_but_count_in_total_quantity() -> TestResult {
    let BestBuy {
        mut store, pixel, ..
    } = best_buy()?;

    store.order([(pixel, 250)])?;

    let active: Vec<&str> = store
        .active_products()
        .map(|(_, product)| product.name())
        .collect();

    assert_eq!(active, ["MacBook Air M2", "Bose QuietComfort Earbuds"]);
    assert_eq!(store.total_quantity(), 600);

    assert!(matches!(
        store.order([(pixel, 1)]),
        Err(StoreError::Line {
            source: ProductError::OutOfStock { available: 0, .. },
            ..
        })
    ));

    Ok(())
}

#[test]
fn removed_products_cannot_be_ordered() -> TestResult {
    let BestBuy {
        mut store, earbuds, ..
    } = best_buy()?;

    let removed = store.remove(earbuds)?;

    assert_eq!(removed.name(), "Bose QuietComfort Earbuds");
    assert_eq!(
        store.order([(earbuds, 1)]),
        Err(StoreError::NotFound(earbuds))
    );
    assert!(matches!(
        store.remove(earbuds),
        Err(StoreError::NotFound(key)) if key == earbuds
    ));

    Ok(())
}

#[test]
fn shared_promotion_prices_every_product_it_is_attached_to() -> TestResult {
    let half_price = Rc::new(Promotion::second_half_price("Second Half price!"));
    let mut store = Store::new(EUR);

    let mouse = store.add(
        Product::new("Mouse", eur(4_000), 10)?.with_promotion(Rc::clone(&half_price)),
    )?;
    let keyboard = store.add(
        Product::new("Keyboard", eur(9_000), 10)?.with_promotion(Rc::clone(&half_price)),
    )?;

    assert_eq!(Rc::strong_count(&half_price), 3);
    assert_eq!(store.order([(mouse, 2), (keyboard, 2)])?, eur(6_000 + 13_500));

    let previous = store
        .get_mut(keyboard)
        .ok_or("keyboard missing")?
        .set_promotion(None);

    assert!(previous.is_some_and(|promotion| Rc::ptr_eq(&promotion, &half_price)));
    assert_eq!(store.order([(keyboard, 2)])?, eur(18_000));

    Ok(())
}

#[test]
fn checkout_itemises_the_order() -> TestResult {
    let BestBuy {
        mut store,
        macbook,
        pixel,
        ..
    } = best_buy()?;

    let receipt = store.checkout([OrderLine::new(macbook, 2), OrderLine::new(pixel, 1)])?;

    assert_eq!(receipt.subtotal(), eur(340_000));
    assert_eq!(receipt.total(), eur(252_500));
    assert_eq!(receipt.savings()?, eur(87_500));

    let promotions: Vec<Option<&str>> = receipt
        .lines()
        .iter()
        .map(ReceiptLine::promotion)
        .collect();

    assert_eq!(promotions, [Some("Second Half price!"), Some("30% off!")]);

    Ok(())
}

#[test]
fn empty_order_costs_nothing() -> TestResult {
    let BestBuy { mut store, .. } = best_buy()?;

    assert_eq!(store.order(Vec::<OrderLine>::new())?, eur(0));

    Ok(())
}
