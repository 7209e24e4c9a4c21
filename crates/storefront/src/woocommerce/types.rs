//! Wire types for the WooCommerce REST API (v3).
//!
//! Only the fields the storefront reads are modelled; everything else in the
//! upstream payload is ignored. WooCommerce encodes money as strings (and uses
//! `""` for "no value"), so amounts go through [`de_amount`] / [`de_opt_amount`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use hearth_core::{CategoryId, OrderId, OrderStatus, ProductId, StockStatus, TagId};

// =============================================================================
// Amount Parsing
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

/// Deserialize an optional amount, treating `""` and `null` as absent.
pub(crate) fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<RawAmount>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawAmount::Text(s)) => s,
        Some(RawAmount::Number(n)) => n.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid amount '{trimmed}': {e}")))
}

/// Deserialize an amount, treating `""` and `null` as zero.
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_amount(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: u64,
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alt: String,
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Tag reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    /// Current selling price.
    #[serde(default, deserialize_with = "de_amount")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub regular_price: Option<Decimal>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub average_rating: Option<Decimal>,
    #[serde(default)]
    pub rating_count: u32,
}

impl Product {
    /// First image, used as the thumbnail.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Parent category ID; `0` for top-level categories.
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub description: String,
    /// Number of published products in the category.
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub image: Option<Image>,
}

/// One page of a product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total matching products across all pages (`X-WP-Total`).
    pub total: u64,
    /// Total number of pages (`X-WP-TotalPages`).
    pub total_pages: u32,
    pub page: u32,
    pub per_page: u32,
}

impl ProductPage {
    /// An empty page, returned when the catalog cannot be queried.
    #[must_use]
    pub const fn empty(page: u32, per_page: u32) -> Self {
        Self {
            products: Vec::new(),
            total: 0,
            total_pages: 0,
            page,
            per_page,
        }
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Address block of an order (`billing` / `shipping`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    /// Only meaningful on the billing address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Only meaningful on the billing address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Order shipping line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub method_id: String,
    pub method_title: String,
    /// Decimal string, as WooCommerce expects.
    pub total: String,
}

/// Normalized order payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    pub billing: OrderAddress,
    pub shipping: OrderAddress,
    pub line_items: Vec<LineItem>,
    pub shipping_lines: Vec<ShippingLine>,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    #[serde(default)]
    pub order_key: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "de_amount")]
    pub total: Decimal,
    #[serde(default)]
    pub currency: String,
    /// Payment page for gateways that redirect; WooCommerce sends `""` when unused.
    #[serde(default)]
    pub payment_url: Option<String>,
}
