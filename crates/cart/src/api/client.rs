//! `reqwest` client for the storefront REST API.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, StockEntry};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, CatalogService, StockService};
use crate::config::StorefrontApiConfig;

/// Client for the storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and catalog cache.
#[derive(Clone)]
pub struct StorefrontApi {
    inner: Arc<StorefrontApiInner>,
}

struct StorefrontApiInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontApi {
    /// Create a new storefront API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StorefrontApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::InvalidHeader(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        // Single entry: the whole product list
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(StorefrontApiInner {
                client,
                base_url: directory_url(config.base_url.clone()),
                cache,
            }),
        })
    }

    /// Drop cached catalog data so the next lookup hits the API.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Issue a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl StockService for StorefrontApi {
    #[instrument(skip(self))]
    async fn stock(&self) -> Result<Vec<StockEntry>, ApiError> {
        let stock: Vec<StockEntry> = self.get_json("stock").await?;
        debug!(entries = stock.len(), "Fetched stock");
        Ok(stock)
    }
}

#[async_trait]
impl CatalogService for StorefrontApi {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Catalog cache hit");
            return Ok(products.as_ref().clone());
        }

        let products: Vec<Product> = self.get_json("products").await?;
        debug!(products = products.len(), "Fetched catalog");

        self.inner
            .cache
            .insert(
                CacheKey::Products,
                CacheValue::Products(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }
}

/// Make sure relative joins append to the base path instead of replacing its
/// last segment (`/api/v1` + `stock` must give `/api/v1/stock`).
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client_for(base: &str) -> StorefrontApi {
        StorefrontApi::new(&StorefrontApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_on_root_url() {
        let api = client_for("http://localhost:3333");
        assert_eq!(
            api.endpoint("stock").unwrap().as_str(),
            "http://localhost:3333/stock"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client_for("https://api.example.com/v1");
        assert_eq!(
            api.endpoint("products").unwrap().as_str(),
            "https://api.example.com/v1/products"
        );

        let api = client_for("https://api.example.com/v1/");
        assert_eq!(
            api.endpoint("products").unwrap().as_str(),
            "https://api.example.com/v1/products"
        );
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let mut config = StorefrontApiConfig::new(Url::parse("http://localhost:3333").unwrap());
        config.token = Some(SecretString::from("bad\ntoken"));

        let result = StorefrontApi::new(&config);
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
    }
}
