//! Cache types for WooCommerce API responses.
//!
//! Products and the category listing share one `moka` cache with per-entry
//! lifetimes: products live for [`PRODUCT_TTL`], the category listing for the
//! configured category TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hearth_core::ProductId;
use moka::Expiry;

use crate::woocommerce::types::{Category, Product};

/// Lifetime of a cached product.
pub const PRODUCT_TTL: Duration = Duration::from_secs(300);

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    ProductSlug(String),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Categories(Arc<[Category]>),
}

/// Per-entry expiry policy.
pub struct CatalogExpiry {
    pub category_ttl: Duration,
}

impl Expiry<CacheKey, CacheValue> for CatalogExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        match key {
            CacheKey::Product(_) | CacheKey::ProductSlug(_) => Some(PRODUCT_TTL),
            CacheKey::Categories => Some(self.category_ttl),
        }
    }
}
