//! Catalog products, cart lines and stock entries.
//!
//! The storefront API returns catalog entries without an `amount`; the same
//! type doubles as a cart line once an amount is attached, so cart snapshots
//! keep every attribute the catalog sent.
//!
//! Only `id` is required. Display fields are optional so that one incomplete
//! catalog entry or snapshot line does not reject the whole list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;

/// A product as listed in the catalog, or as a line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    /// Unit price, serialized as a JSON number. `None` when the catalog
    /// entry has no price.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Quantity in the cart. Catalog entries carry none, so it defaults to 0.
    #[serde(default)]
    pub amount: u32,
    /// Remaining catalog attributes, carried through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Return a copy of this product with a different cart amount.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Price of the whole line (`price * amount`), zero when the price is
    /// unknown. Saturates instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.map_or(Decimal::ZERO, |price| {
            price.saturating_mul(Decimal::from(self.amount))
        })
    }
}

/// Units of a product available for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: ProductId,
    pub amount: u32,
}
