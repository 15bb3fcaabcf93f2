//! Cart operation errors.
//!
//! Every cart operation reports its failure twice: as a notification for the
//! shopper and as the returned `CartError` for the calling code.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::api::ApiError;
use crate::notify::NotificationKind;
use crate::storage::StorageError;

/// Error returned by a cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock cannot cover the requested quantity.
    #[error(
        "Out of stock: product {product_id} requested {requested}, {available} available"
    )]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The catalog has no product with this id.
    #[error("Not found: product {0}")]
    ProductNotFound(ProductId),

    /// Stock or catalog request failed.
    #[error("Storefront API error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether this is a stock rule violation rather than a failure.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        matches!(self, Self::OutOfStock { .. })
    }

    /// Notification to show for this error during `failed` operation.
    #[must_use]
    pub const fn notification_kind(&self, failed: NotificationKind) -> NotificationKind {
        if self.is_out_of_stock() {
            NotificationKind::OutOfStock
        } else {
            failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: product 1 requested 3, 2 available"
        );

        let err = CartError::ProductNotFound(ProductId::new(9));
        assert_eq!(err.to_string(), "Not found: product 9");
    }

    #[test]
    fn test_notification_kind_mapping() {
        let out_of_stock = CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 1,
            available: 0,
        };
        assert_eq!(
            out_of_stock.notification_kind(NotificationKind::AddFailed),
            NotificationKind::OutOfStock
        );

        let api = CartError::Api(ApiError::Status {
            status: 500,
            message: String::new(),
        });
        assert!(!api.is_out_of_stock());
        assert_eq!(
            api.notification_kind(NotificationKind::UpdateFailed),
            NotificationKind::UpdateFailed
        );
    }
}
