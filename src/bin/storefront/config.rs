//! Storefront configuration

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser};

/// Storefront command line
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Stock a store from fixtures and place an order", long_about = None)]
pub struct StorefrontConfig {
    /// Directory holding `products/` and `promotions/` fixture files
    #[arg(long, env = "STOREFRONT_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set to stock the store with
    #[arg(short, long, env = "STOREFRONT_FIXTURE", default_value = "best_buy")]
    pub fixture: String,

    /// Order line as `PRODUCT=QUANTITY`; repeat for more lines
    #[arg(short, long = "order", value_name = "PRODUCT=QUANTITY")]
    pub orders: Vec<OrderArg>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// One `PRODUCT=QUANTITY` order line from the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderArg {
    /// Fixture product key
    pub product: String,

    /// Units to buy
    pub quantity: u32,
}

impl FromStr for OrderArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product, quantity) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PRODUCT=QUANTITY, got `{s}`"))?;

        let product = product.trim();

        if product.is_empty() {
            return Err(format!("missing product key in `{s}`"));
        }

        let quantity = quantity
            .trim()
            .parse()
            .map_err(|err| format!("invalid quantity in `{s}`: {err}"))?;

        Ok(Self {
            product: product.to_string(),
            quantity,
        })
    }
}
