//! Storefront
//!
//! Stocks a store from a fixture set, lists what is on sale and, when order
//! lines are given, places a single order and prints its receipt.
//!
//! ```text
//! storefront --fixture best_buy --order macbook=2 --order earbuds=3
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use storefront::fixtures::Fixture;
use tracing::info;

use crate::config::StorefrontConfig;

mod config;
mod logging;

fn main() -> Result<()> {
    let config = StorefrontConfig::parse();

    logging::init_subscriber(&config.logging)?;

    let mut fixture = Fixture::with_base_path(&config.fixtures_dir);

    fixture
        .load_promotions(&config.fixture)?
        .load_products(&config.fixture)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let store = fixture.store()?;

    writeln!(handle, "Active products:")?;

    for (_, product) in store.active_products() {
        writeln!(handle, "  {product}")?;
    }

    writeln!(handle, "Total quantity: {}", store.total_quantity())?;

    if config.orders.is_empty() {
        return Ok(());
    }

    let lines = fixture.order_lines(
        config
            .orders
            .iter()
            .map(|order| (order.product.as_str(), order.quantity)),
    )?;

    let receipt = fixture.store_mut()?.checkout(lines)?;

    receipt.write_to(&mut handle)?;

    info!(
        fixture = %config.fixture,
        lines = receipt.lines().len(),
        total = %receipt.total(),
        "order placed"
    );

    Ok(())
}
