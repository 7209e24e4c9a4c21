//! Shipping tiers and order totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat tax rate applied to subtotal plus shipping.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Fixed-price shipping tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl ShippingMethod {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    /// Flat rate for this tier.
    #[must_use]
    pub const fn rate(self) -> Decimal {
        match self {
            Self::Standard => Decimal::ZERO,
            Self::Express => Decimal::from_parts(999, 0, 0, false, 2),
            Self::Overnight => Decimal::from_parts(2499, 0, 0, false, 2),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping",
            Self::Express => "Express Shipping",
            Self::Overnight => "Overnight Shipping",
        }
    }

    /// WooCommerce shipping method ID.
    #[must_use]
    pub const fn method_id(self) -> &'static str {
        match self {
            Self::Standard => "free_shipping",
            Self::Express | Self::Overnight => "flat_rate",
        }
    }
}

/// Derived money figures for a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl Totals {
    /// Compute totals for a cart subtotal and shipping tier.
    #[must_use]
    pub fn compute(subtotal: Decimal, method: ShippingMethod) -> Self {
        let shipping = method.rate();
        let tax = ((subtotal + shipping) * TAX_RATE).round_dp(2);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}
