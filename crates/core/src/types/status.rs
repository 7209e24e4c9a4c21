//! Status enums for catalog and order entities.
//!
//! Wire values match the WooCommerce REST API.

use serde::{Deserialize, Serialize};

/// Product stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StockStatus {
    #[default]
    #[serde(rename = "instock")]
    InStock,
    #[serde(rename = "outofstock")]
    OutOfStock,
    #[serde(rename = "onbackorder")]
    OnBackorder,
}

impl StockStatus {
    /// Whether the product can be added to a cart.
    ///
    /// Backordered products remain purchasable.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }

    /// Wire value used in upstream query parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "instock",
            Self::OutOfStock => "outofstock",
            Self::OnBackorder => "onbackorder",
        }
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    CheckoutDraft,
    /// Any status added by a plugin that this crate does not know about.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_wire_values() {
        let status: StockStatus = serde_json::from_str("\"outofstock\"").unwrap();
        assert_eq!(status, StockStatus::OutOfStock);
        assert!(!status.is_purchasable());

        let status: StockStatus = serde_json::from_str("\"onbackorder\"").unwrap();
        assert!(status.is_purchasable());
        assert_eq!(serde_json::to_string(&StockStatus::InStock).unwrap(), "\"instock\"");
    }

    #[test]
    fn test_order_status_wire_values() {
        let status: OrderStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(status, OrderStatus::OnHold);

        let status: OrderStatus = serde_json::from_str("\"checkout-draft\"").unwrap();
        assert_eq!(status, OrderStatus::CheckoutDraft);

        let status: OrderStatus = serde_json::from_str("\"wc-custom-thing\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }
}
