//! Integration test support for the RocketShoes cart.
//!
//! [`FixtureServer`] serves `/stock` and `/products` from memory on a random
//! local port, so tests exercise the real `reqwest` client end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::StorefrontApiConfig;
use rocketshoes_core::{Product, ProductId, StockEntry};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use url::Url;

/// How the fixture answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve the fixture data.
    Healthy,
    /// Answer with `500 Internal Server Error`.
    Failing,
    /// Answer `200 OK` with a body that is not JSON.
    Malformed,
}

#[derive(Clone)]
struct FixtureState {
    inner: Arc<FixtureInner>,
}

struct FixtureInner {
    stock: Mutex<Vec<StockEntry>>,
    products: serde_json::Value,
    mode: Mutex<Mode>,
    token: Option<String>,
    stock_hits: AtomicUsize,
    product_hits: AtomicUsize,
}

/// In-process storefront API.
pub struct FixtureServer {
    base_url: Url,
    state: FixtureState,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    /// Start serving `stock` and `products` on `127.0.0.1`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(stock: Vec<StockEntry>, products: Vec<Product>) -> std::io::Result<Self> {
        Self::start_with_token(stock, products, None).await
    }

    /// Serve `products` verbatim, for catalogs that do not fit [`Product`].
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start_with_catalog_json(
        stock: Vec<StockEntry>,
        products: serde_json::Value,
    ) -> std::io::Result<Self> {
        Self::bind(stock, products, None).await
    }

    /// Like [`FixtureServer::start`], but every request must carry
    /// `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start_with_token(
        stock: Vec<StockEntry>,
        products: Vec<Product>,
        token: Option<&str>,
    ) -> std::io::Result<Self> {
        let products = serde_json::to_value(products).map_err(std::io::Error::other)?;
        Self::bind(stock, products, token).await
    }

    async fn bind(
        stock: Vec<StockEntry>,
        products: serde_json::Value,
        token: Option<&str>,
    ) -> std::io::Result<Self> {
        let state = FixtureState {
            inner: Arc::new(FixtureInner {
                stock: Mutex::new(stock),
                products,
                mode: Mutex::new(Mode::Healthy),
                token: token.map(str::to_string),
                stock_hits: AtomicUsize::new(0),
                product_hits: AtomicUsize::new(0),
            }),
        };

        let app = Router::new()
            .route("/stock", get(stock_handler))
            .route("/products", get(products_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = Url::parse(&format!("http://{}", listener.local_addr()?))
            .map_err(std::io::Error::other)?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            state,
            handle,
        })
    }

    /// Base URL of the fixture.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// API client configuration pointing at this fixture.
    #[must_use]
    pub fn api_config(&self) -> StorefrontApiConfig {
        StorefrontApiConfig::new(self.base_url())
    }

    pub fn set_mode(&self, mode: Mode) {
        *self
            .state
            .inner
            .mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// Change the available amount of one product, adding an entry if needed.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        let mut stock = self
            .state
            .inner
            .stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match stock.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => entry.amount = amount,
            None => stock.push(StockEntry { id, amount }),
        }
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.inner.stock_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.inner.product_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FixtureState {
    fn mode(&self) -> Mode {
        *self
            .inner
            .mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject the request unless it is authorized and the fixture is healthy.
    fn check(&self, headers: &HeaderMap) -> Option<Response> {
        if let Some(token) = &self.inner.token {
            let expected = format!("Bearer {token}");
            let authorized = headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == expected);
            if !authorized {
                return Some((StatusCode::UNAUTHORIZED, "missing or invalid token").into_response());
            }
        }

        match self.mode() {
            Mode::Healthy => None,
            Mode::Failing => {
                Some((StatusCode::INTERNAL_SERVER_ERROR, "fixture failure").into_response())
            }
            Mode::Malformed => Some((StatusCode::OK, "<html>not json</html>").into_response()),
        }
    }
}

async fn stock_handler(State(state): State<FixtureState>, headers: HeaderMap) -> Response {
    state.inner.stock_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = state.check(&headers) {
        return rejection;
    }
    let stock = state
        .inner
        .stock
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(stock).into_response()
}

async fn products_handler(State(state): State<FixtureState>, headers: HeaderMap) -> Response {
    state.inner.product_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = state.check(&headers) {
        return rejection;
    }
    Json(state.inner.products.clone()).into_response()
}

// =============================================================================
// Sample data
// =============================================================================

/// A catalog entry as the storefront API serves it (no `amount`).
#[must_use]
pub fn sample_product(id: u64, title: &str, price_cents: i64) -> Product {
    let mut attributes = serde_json::Map::new();
    attributes.insert("brand".to_string(), serde_json::Value::from("Rocket"));
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Some(Decimal::new(price_cents, 2)),
        image: format!("https://img.rocketshoes.example/{id}.jpg"),
        amount: 0,
        attributes,
    }
}

/// Three shoes.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    vec![
        sample_product(1, "Tênis de Caminhada Leve Confortável", 17_990),
        sample_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13_990),
        sample_product(3, "Tênis Adidas Duramo Lite 2.0", 21_990),
    ]
}

/// Stock entries from `(id, amount)` pairs.
#[must_use]
pub fn stock(entries: &[(u64, u32)]) -> Vec<StockEntry> {
    entries
        .iter()
        .map(|&(id, amount)| StockEntry {
            id: ProductId::new(id),
            amount,
        })
        .collect()
}
