//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by the RocketShoes cart components:
//! - `cart` - Cart store, storefront API client and persistence
//! - `cli` - Command-line driver for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, catalog/cart products, stock entries and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
