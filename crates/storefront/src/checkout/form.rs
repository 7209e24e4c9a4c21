//! Checkout form data.

use serde::{Deserialize, Serialize};

use crate::checkout::ShippingMethod;

/// A postal address with contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "address1")]
    pub address_1: String,
    #[serde(rename = "address2")]
    pub address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Card fields collected on the payment step.
///
/// Validated only; never sent to the commerce backend.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDetails {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_month: Option<u32>,
    pub expiry_year: Option<u32>,
    pub cvv: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &"[REDACTED]")
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// How the shopper intends to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PaymentMethod {
    Card(CardDetails),
    #[serde(rename = "paypal")]
    PayPal,
    BankTransfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Card(CardDetails::default())
    }
}

impl PaymentMethod {
    /// Gateway ID and title sent with the order.
    #[must_use]
    pub const fn gateway(&self) -> (&'static str, &'static str) {
        match self {
            Self::Card(_) => ("stripe", "Credit Card"),
            Self::PayPal => ("ppcp-gateway", "PayPal"),
            Self::BankTransfer => ("bacs", "Direct Bank Transfer"),
        }
    }
}

/// Everything the checkout collects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    /// Separate billing address; `None` bills to the shipping address.
    pub billing_address: Option<Address>,
}

impl CheckoutForm {
    /// The address to bill.
    #[must_use]
    pub fn billing(&self) -> &Address {
        self.billing_address.as_ref().unwrap_or(&self.shipping_address)
    }
}
