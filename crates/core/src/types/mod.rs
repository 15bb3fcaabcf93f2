//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod id;
pub mod price;
pub mod product;

pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, Price};
pub use product::{Product, StockEntry};
