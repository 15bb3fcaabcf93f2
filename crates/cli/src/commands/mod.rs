//! CLI subcommands.

use rocketshoes_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

pub mod cart;
pub mod catalog;

/// Unit price column; `-` when the catalog sent no price.
fn format_price(price: Option<Decimal>, currency: CurrencyCode) -> String {
    price.map_or_else(
        || "-".to_string(),
        |amount| Price::new(amount, currency).display(),
    )
}
