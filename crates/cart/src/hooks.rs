//! Mutation hooks.
//!
//! The store calls every registered hook with the candidate cart before it
//! commits a change. If any hook fails the change is dropped, so whatever a
//! hook mirrors (storage, analytics) never disagrees with the in-memory cart.

use std::sync::Arc;

use rocketshoes_core::Product;

use crate::storage::{CartStorage, StorageError};

/// Observer of committed cart changes.
pub trait MutationHook: Send + Sync {
    /// Called with the full cart that is about to be committed.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the commit.
    fn on_mutation(&self, cart: &[Product]) -> Result<(), StorageError>;
}

/// Writes the full cart to storage on every change.
pub struct PersistCart {
    storage: Arc<dyn CartStorage>,
    key: String,
}

impl PersistCart {
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

impl MutationHook for PersistCart {
    fn on_mutation(&self, cart: &[Product]) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(cart)?;
        self.storage.write(&self.key, &snapshot)?;
        tracing::debug!(key = %self.key, lines = cart.len(), "Persisted cart");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStorage, load_snapshot};

    #[test]
    fn test_persist_cart_writes_serialized_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let hook = PersistCart::new(storage.clone(), "@RocketShoes:cart");

        let cart = vec![Product {
            id: ProductId::new(4),
            title: "Tênis Nike".to_string(),
            price: Some(Decimal::new(1999, 1)),
            image: String::new(),
            amount: 3,
            attributes: serde_json::Map::new(),
        }];
        hook.on_mutation(&cart).unwrap();

        assert_eq!(
            storage.get("@RocketShoes:cart").unwrap(),
            serde_json::to_string(&cart).unwrap()
        );
        assert_eq!(load_snapshot(storage.as_ref(), "@RocketShoes:cart"), cart);
    }
}
