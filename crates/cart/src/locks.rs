//! Per-product mutation locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::ProductId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per product id, so a read-check-commit sequence on a
/// product cannot interleave with another on the same product.
#[derive(Debug, Default)]
pub struct ProductLocks {
    locks: Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>,
}

impl ProductLocks {
    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on are only referenced by the map
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let locks = Arc::new(ProductLocks::default());
        let guard = locks.acquire(ProductId::new(1)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(ProductId::new(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        assert!(contender.await.is_ok());
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = ProductLocks::default();
        let _first = locks.acquire(ProductId::new(1)).await;
        let _second = locks.acquire(ProductId::new(2)).await;
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = ProductLocks::default();
        drop(locks.acquire(ProductId::new(1)).await);
        drop(locks.acquire(ProductId::new(2)).await);
        let _third = locks.acquire(ProductId::new(3)).await;
        assert_eq!(locks.tracked(), 1);
    }
}
