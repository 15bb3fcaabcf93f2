//! The cart store.
//!
//! [`CartStore`] owns the shopper's cart for one session. It is created once,
//! cloned into whatever needs it (UI callbacks, background tasks) and exposes
//! three mutations:
//!
//! - [`CartStore::add_product`] - one more unit, checked against stock
//! - [`CartStore::remove_product`] - drop the line
//! - [`CartStore::update_product_amount`] - set the quantity, checked against stock
//!
//! # Commit model
//!
//! Each mutation builds the next cart from the latest committed one, runs the
//! registered [`MutationHook`]s on it (persistence by default) and only then
//! publishes it. A failed hook leaves both the in-memory cart and storage as
//! they were.
//!
//! Mutations on the same product id are serialized for their whole duration.
//! Mutations on different ids fetch stock concurrently and only queue up for
//! the commit step, so neither loses the other's line. Hooks run on the
//! blocking thread pool with no lock on the published cart, so readers of
//! [`CartStore::cart`] never wait for storage.
//!
//! # Failures
//!
//! Failures never escape as panics. They are sent to the [`Notifier`] with a
//! localized message and also returned as [`CartError`] for callers that want
//! to branch on the outcome.

use std::io;
use std::sync::Arc;

use rocketshoes_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::api::{CatalogService, StockService};
use crate::error::CartError;
use crate::hooks::{MutationHook, PersistCart};
use crate::locks::ProductLocks;
use crate::notify::{Locale, LogNotifier, Notification, NotificationKind, Notifier};
use crate::storage::{CartStorage, StorageError, load_snapshot};

/// What a successful operation did to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    /// The line was added or its amount changed; holds the new line.
    Saved(Product),
    /// The line was removed; holds the removed line.
    Removed(Product),
    /// Nothing to do.
    Unchanged,
}

/// Totals for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of distinct products.
    pub line_count: usize,
    /// Sum of all amounts.
    pub item_count: u64,
    pub subtotal: Price,
}

impl CartSummary {
    fn from_cart(cart: &[Product], locale: Locale) -> Self {
        Self {
            line_count: cart.len(),
            item_count: cart.iter().map(|line| u64::from(line.amount)).sum(),
            subtotal: Price::new(
                cart.iter()
                    .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.line_total())),
                locale.currency(),
            ),
        }
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// Shopping cart state for one session.
///
/// Cheaply cloneable via `Arc`; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
    hooks: Vec<Arc<dyn MutationHook>>,
    locale: Locale,
    state: watch::Sender<Vec<Product>>,
    locks: ProductLocks,
    /// Held from reading the latest cart until the next one is published.
    commit_lock: Mutex<()>,
}

impl CartStore {
    /// Start building a store on top of the given stock and catalog services.
    #[must_use]
    pub fn builder(
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn CatalogService>,
    ) -> CartStoreBuilder {
        CartStoreBuilder {
            stock,
            catalog,
            notifier: Arc::new(LogNotifier),
            hooks: Vec::new(),
            locale: Locale::default(),
            initial: Vec::new(),
        }
    }

    /// Current cart lines.
    #[must_use]
    pub fn cart(&self) -> Vec<Product> {
        self.inner.state.borrow().clone()
    }

    /// Cart line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<Product> {
        self.inner
            .state
            .borrow()
            .iter()
            .find(|line| line.id == product_id)
            .cloned()
    }

    /// Watch the cart. The receiver sees every committed cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.inner.state.subscribe()
    }

    /// Line count, item count and subtotal of the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_cart(&self.inner.state.borrow(), self.inner.locale)
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.inner.locale
    }

    /// Add one unit of `product_id`.
    ///
    /// New lines are filled in from the catalog. The new amount must not
    /// exceed the stock reported for the product; a product missing from the
    /// stock list has none available.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` when stock is insufficient, and an
    /// API, storage or not-found error otherwise. The cart is unchanged in
    /// every error case and the notifier has been told.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.try_add(product_id).await;
        self.report(NotificationKind::AddFailed, product_id, result)
    }

    /// Remove the line for `product_id`. Removing an absent product is a no-op
    /// and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting the cart fails.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let result = self.try_remove(product_id).await;
        self.report(NotificationKind::RemoveFailed, product_id, result)
    }

    /// Set the amount of an existing line.
    ///
    /// An amount of zero is ignored. Products that are not in the cart, or
    /// that have no stock entry, are left alone.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` when `amount` exceeds stock, and an
    /// API or storage error otherwise.
    #[instrument(skip_all, fields(product_id = %product_id, amount = amount))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<CartChange, CartError> {
        if amount == 0 {
            debug!("Ignoring update to zero");
            return Ok(CartChange::Unchanged);
        }
        let result = self.try_update(product_id, amount).await;
        self.report(NotificationKind::UpdateFailed, product_id, result)
    }

    async fn try_add(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let _guard = self.inner.locks.acquire(product_id).await;

        let available = self
            .inner
            .stock
            .available(product_id)
            .await?
            .unwrap_or(0);
        let current = self.get(product_id);
        let requested = current
            .as_ref()
            .map_or(0, |line| line.amount)
            .saturating_add(1);

        if requested > available {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available,
            });
        }

        let line = match current {
            Some(line) => line,
            None => self
                .inner
                .catalog
                .product(product_id)
                .await?
                .ok_or(CartError::ProductNotFound(product_id))?,
        };
        let line = line.with_amount(requested);

        self.commit(|cart| {
            upsert(cart, line.clone());
            true
        })
        .await?;
        info!(amount = requested, "Added product to cart");
        Ok(CartChange::Saved(line))
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<CartChange, CartError> {
        let _guard = self.inner.locks.acquire(product_id).await;

        let mut removed = None;
        self.commit(|cart| match cart.iter().position(|line| line.id == product_id) {
            Some(index) => {
                removed = Some(cart.remove(index));
                true
            }
            None => false,
        })
        .await?;

        Ok(removed.map_or(CartChange::Unchanged, |line| {
            info!("Removed product from cart");
            CartChange::Removed(line)
        }))
    }

    async fn try_update(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<CartChange, CartError> {
        let _guard = self.inner.locks.acquire(product_id).await;

        let Some(available) = self.inner.stock.available(product_id).await? else {
            debug!("No stock entry, leaving cart unchanged");
            return Ok(CartChange::Unchanged);
        };
        let Some(current) = self.get(product_id) else {
            debug!("Product not in cart, leaving cart unchanged");
            return Ok(CartChange::Unchanged);
        };

        if amount > available {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available,
            });
        }

        let line = current.with_amount(amount);
        self.commit(|cart| {
            upsert(cart, line.clone());
            true
        })
        .await?;
        info!("Updated product amount");
        Ok(CartChange::Saved(line))
    }

    /// Apply `change` to a copy of the latest cart, run the hooks on it and
    /// publish it. `change` returns `false` when it had nothing to do.
    async fn commit(
        &self,
        change: impl FnOnce(&mut Vec<Product>) -> bool,
    ) -> Result<bool, StorageError> {
        let _commit = self.inner.commit_lock.lock().await;

        let mut next = self.inner.state.borrow().clone();
        if !change(&mut next) {
            return Ok(false);
        }

        let hooks = self.inner.hooks.clone();
        let next = tokio::task::spawn_blocking(move || {
            for hook in &hooks {
                hook.on_mutation(&next)?;
            }
            Ok::<_, StorageError>(next)
        })
        .await
        .map_err(|e| StorageError::Io(io::Error::other(e)))??;

        self.inner.state.send_replace(next);
        Ok(true)
    }

    /// Log and notify on failure, then hand the result back to the caller.
    fn report(
        &self,
        failed: NotificationKind,
        product_id: ProductId,
        result: Result<CartChange, CartError>,
    ) -> Result<CartChange, CartError> {
        if let Err(err) = &result {
            if err.is_out_of_stock() {
                info!(error = %err, "Cart change rejected");
            } else {
                error!(error = %err, "Cart operation failed");
            }
            self.inner.notifier.notify(&Notification::new(
                err.notification_kind(failed),
                product_id,
                self.inner.locale,
            ));
        }
        result
    }
}

// =============================================================================
// CartStoreBuilder
// =============================================================================

/// Builder for [`CartStore`].
pub struct CartStoreBuilder {
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
    hooks: Vec<Arc<dyn MutationHook>>,
    locale: Locale,
    initial: Vec<Product>,
}

impl CartStoreBuilder {
    /// Where notifications go. Defaults to [`LogNotifier`].
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub const fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Register a hook run before every commit, after the ones already added.
    #[must_use]
    pub fn hook(mut self, hook: Arc<dyn MutationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Restore the cart from `storage` under `key` and persist every change
    /// back to it.
    #[must_use]
    pub fn persistence(self, storage: Arc<dyn CartStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = load_snapshot(storage.as_ref(), &key);
        self.initial_cart(initial)
            .hook(Arc::new(PersistCart::new(storage, key)))
    }

    /// Start from these lines instead of an empty cart.
    #[must_use]
    pub fn initial_cart(mut self, cart: Vec<Product>) -> Self {
        self.initial = cart;
        self
    }

    #[must_use]
    pub fn build(self) -> CartStore {
        let (state, _) = watch::channel(dedupe(self.initial));
        CartStore {
            inner: Arc::new(CartStoreInner {
                stock: self.stock,
                catalog: self.catalog,
                notifier: self.notifier,
                hooks: self.hooks,
                locale: self.locale,
                state,
                locks: ProductLocks::default(),
                commit_lock: Mutex::new(()),
            }),
        }
    }
}

/// Replace the line with the same id in place, or append.
fn upsert(cart: &mut Vec<Product>, line: Product) {
    match cart.iter_mut().find(|existing| existing.id == line.id) {
        Some(existing) => *existing = line,
        None => cart.push(line),
    }
}

/// Keep the first line per product id.
fn dedupe(lines: Vec<Product>) -> Vec<Product> {
    let mut cart: Vec<Product> = Vec::with_capacity(lines.len());
    for line in lines {
        if cart.iter().any(|existing| existing.id == line.id) {
            warn!(product_id = %line.id, "Dropping duplicate cart line");
            continue;
        }
        cart.push(line);
    }
    cart
}
