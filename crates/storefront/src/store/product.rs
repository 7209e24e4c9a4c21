//! Product data captured into cart and wishlist entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearth_core::{ProductId, StockStatus};

use crate::woocommerce::Product;

/// The subset of a product an entry keeps.
///
/// Captured when the entry is created so the cart can be rendered and totalled
/// without another catalog call. Prices are those at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub regular_price: Option<Decimal>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock_status: StockStatus,
}

impl ProductSnapshot {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.stock_status.is_purchasable()
    }
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            regular_price: product.regular_price,
            on_sale: product.on_sale,
            image: product.featured_image().map(|img| img.src.clone()),
            stock_status: product.stock_status,
        }
    }
}
