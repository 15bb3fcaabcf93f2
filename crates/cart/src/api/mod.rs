//! Storefront API: stock and catalog services.
//!
//! # Architecture
//!
//! - [`StockService`] and [`CatalogService`] are the seams the cart store
//!   depends on; tests swap in in-memory implementations
//! - [`StorefrontApi`] implements both over `reqwest`
//! - Stock is authoritative and fetched on every call, never cached
//! - Catalog responses are cached in memory via `moka`
//!
//! # Endpoints
//!
//! - `GET /stock` - `[{ "id": 1, "amount": 3 }, ...]`
//! - `GET /products` - `[{ "id": 1, "title": "...", "price": 179.9, "image": "..." }, ...]`

mod cache;
mod client;

pub use client::StorefrontApi;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, StockEntry};
use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured header value is not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Source of per-product stock levels.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the full stock list.
    async fn stock(&self) -> Result<Vec<StockEntry>, ApiError>;

    /// Units available for `id`, or `None` if the stock list has no entry.
    async fn available(&self, id: ProductId) -> Result<Option<u32>, ApiError> {
        Ok(self
            .stock()
            .await?
            .into_iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.amount))
    }
}

/// Source of catalog product data.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the full product list.
    async fn products(&self) -> Result<Vec<Product>, ApiError>;

    /// Look up one product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        Ok(self.products().await?.into_iter().find(|p| p.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");

        let err = ApiError::InvalidHeader("bad token".to_string());
        assert_eq!(err.to_string(), "Invalid header: bad token");
    }
}
