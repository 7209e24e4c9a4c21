//! Catalog inspection commands.
//!
//! Read-only queries against the configured WooCommerce store, using the
//! same client and filter translation as the storefront.
//!
//! # Environment Variables
//!
//! - `WOOCOMMERCE_STORE_URL` - WordPress site URL
//! - `WOOCOMMERCE_CONSUMER_KEY` / `WOOCOMMERCE_CONSUMER_SECRET` - REST API
//!   credentials

use hearth_core::{CurrencyCode, Price};
use hearth_storefront::config::{ConfigError, WooCommerceConfig};
use hearth_storefront::woocommerce::{CommerceError, ProductFilter, ProductSort, WooCommerceClient};
use thiserror::Error;

/// Errors that can occur while querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("WooCommerce error: {0}")]
    Commerce(#[from] CommerceError),

    #[error("Unknown sort order: {0}")]
    InvalidSort(String),
}

fn client() -> Result<WooCommerceClient, CatalogError> {
    dotenvy::dotenv().ok();
    let config = WooCommerceConfig::from_env()?;
    Ok(WooCommerceClient::new(&config)?)
}

/// Print every product category.
pub async fn categories() -> Result<(), CatalogError> {
    let categories = client()?.list_categories().await?;

    #[allow(clippy::print_stdout)]
    for category in categories.iter() {
        println!(
            "{:>6}  {:<32} {:<32} {:>5}",
            category.id, category.slug, category.name, category.count
        );
    }

    tracing::info!("{} categories", categories.len());
    Ok(())
}

/// Print one page of products matching the filter.
pub async fn products(
    categories: Vec<String>,
    search: Option<String>,
    sort: Option<&str>,
    page: u32,
) -> Result<(), CatalogError> {
    let sort = sort
        .map(|value| {
            ProductSort::parse(value).ok_or_else(|| CatalogError::InvalidSort(value.to_owned()))
        })
        .transpose()?;

    let filter = ProductFilter {
        page: Some(page),
        search,
        categories,
        sort,
        ..ProductFilter::default()
    };

    let result = client()?.list_products(&filter).await?;

    #[allow(clippy::print_stdout)]
    for product in &result.products {
        println!(
            "{:>6}  {:<40} {:>10}  {}",
            product.id,
            product.name,
            Price::new(product.price, CurrencyCode::USD).display(),
            product.stock_status.as_str()
        );
    }

    tracing::info!(
        "Page {} of {} ({} products)",
        result.page,
        result.total_pages,
        result.total
    );
    Ok(())
}
