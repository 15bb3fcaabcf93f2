//! Stock and catalog listings straight from the storefront API.

use rocketshoes_cart::{ApiError, CatalogService, Locale, StockService, StorefrontApi};

use super::format_price;

/// Print the stock list.
///
/// # Errors
///
/// Returns `ApiError` if the request fails.
pub async fn stock(api: &StorefrontApi) -> Result<(), ApiError> {
    let stock = api.stock().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<6} {:>9}", "ID", "AVAILABLE");
        for entry in &stock {
            println!("{:<6} {:>9}", entry.id, entry.amount);
        }
    }
    Ok(())
}

/// Print the catalog.
///
/// # Errors
///
/// Returns `ApiError` if the request fails.
pub async fn products(api: &StorefrontApi, locale: Locale) -> Result<(), ApiError> {
    let products = api.products().await?;
    let currency = locale.currency();

    #[allow(clippy::print_stdout)]
    {
        println!("{:<6} {:>12}  TITLE", "ID", "PRICE");
        for product in &products {
            println!(
                "{:<6} {:>12}  {}",
                product.id,
                format_price(product.price, currency),
                product.title
            );
        }
    }
    Ok(())
}
