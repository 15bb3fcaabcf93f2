//! RocketShoes cart library.
//!
//! Holds the shopper's cart in memory, checks every quantity change against
//! the storefront's stock endpoint and writes the cart to local storage after
//! each successful change.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::{CartConfig, CartStore, FileStorage, StorefrontApi};
//!
//! let config = CartConfig::from_env()?;
//! let api = Arc::new(StorefrontApi::new(&config.api)?);
//! let storage = Arc::new(FileStorage::new(&config.storage_dir));
//!
//! let store = CartStore::builder(api.clone(), api)
//!     .locale(config.locale)
//!     .persistence(storage, config.cart_key())
//!     .build();
//!
//! store.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod hooks;
mod locks;
pub mod notify;
pub mod storage;
pub mod store;

pub use api::{ApiError, CatalogService, StockService, StorefrontApi};
pub use config::{CartConfig, ConfigError, StorefrontApiConfig};
pub use error::CartError;
pub use hooks::{MutationHook, PersistCart};
pub use notify::{Locale, LogNotifier, Notification, NotificationKind, NotificationQueue, Notifier};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartChange, CartStore, CartStoreBuilder, CartSummary};
