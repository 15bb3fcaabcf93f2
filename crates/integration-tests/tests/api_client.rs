//! Storefront API client against the fixture server.

#![allow(clippy::unwrap_used)]

use rocketshoes_cart::{ApiError, CatalogService, StockService, StorefrontApi};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::{FixtureServer, Mode, sample_catalog, stock};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_fetch_stock() {
    let server = FixtureServer::start(stock(&[(1, 3), (2, 0)]), sample_catalog())
        .await
        .unwrap();
    let api = StorefrontApi::new(&server.api_config()).unwrap();

    let entries = api.stock().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(api.available(ProductId::new(1)).await.unwrap(), Some(3));
    assert_eq!(api.available(ProductId::new(2)).await.unwrap(), Some(0));
    assert_eq!(api.available(ProductId::new(9)).await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_products() {
    let server = FixtureServer::start(Vec::new(), sample_catalog())
        .await
        .unwrap();
    let api = StorefrontApi::new(&server.api_config()).unwrap();

    let products = api.products().await.unwrap();
    assert_eq!(products.len(), 3);

    let product = api.product(ProductId::new(2)).await.unwrap().unwrap();
    assert_eq!(product.price, Some(Decimal::new(13_990, 2)));
    assert_eq!(product.amount, 0);
    assert!(api.product(ProductId::new(7)).await.unwrap().is_none());

    assert_eq!(server.product_hits(), 1);
}

#[tokio::test]
async fn test_error_status() {
    let server = FixtureServer::start(stock(&[(1, 1)]), sample_catalog())
        .await
        .unwrap();
    server.set_mode(Mode::Failing);
    let api = StorefrontApi::new(&server.api_config()).unwrap();

    let err = api.stock().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "fixture failure");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = FixtureServer::start(stock(&[(1, 1)]), sample_catalog())
        .await
        .unwrap();
    server.set_mode(Mode::Malformed);
    let api = StorefrontApi::new(&server.api_config()).unwrap();

    assert!(matches!(api.products().await, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn test_failed_catalog_is_not_cached() {
    let server = FixtureServer::start(Vec::new(), sample_catalog())
        .await
        .unwrap();
    server.set_mode(Mode::Failing);
    let api = StorefrontApi::new(&server.api_config()).unwrap();

    assert!(api.products().await.is_err());
    server.set_mode(Mode::Healthy);
    assert_eq!(api.products().await.unwrap().len(), 3);
    assert_eq!(server.product_hits(), 2);
}
