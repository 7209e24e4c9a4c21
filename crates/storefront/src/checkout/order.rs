//! Translation between checkout state and the order API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearth_core::{OrderId, OrderStatus};

use crate::checkout::{Address, CheckoutForm, Totals};
use crate::store::CartStore;
use crate::woocommerce::{LineItem, OrderAddress, OrderRequest, OrderResponse, ShippingLine};

/// A placed order, as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub order_key: String,
    pub status: OrderStatus,
    /// Total quoted to the shopper at submission.
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    /// Where to complete payment, for gateways that redirect.
    pub payment_url: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub(crate) fn new(response: OrderResponse, totals: &Totals) -> Self {
        if !response.total.is_zero() && response.total != totals.total {
            tracing::info!(
                order_id = %response.id,
                quoted = %totals.total,
                upstream = %response.total,
                "Upstream order total differs from quoted total"
            );
        }

        Self {
            order_id: response.id,
            order_key: response.order_key,
            status: response.status,
            total: totals.total,
            payment_url: response.payment_url.filter(|url| !url.trim().is_empty()),
            placed_at: Utc::now(),
        }
    }
}

/// Build the order payload for `form` and the contents of `cart`.
///
/// Card details are never included; the gateway collects payment itself.
#[must_use]
pub fn build_order(form: &CheckoutForm, cart: &CartStore) -> OrderRequest {
    let (payment_method, payment_method_title) = form.payment_method.gateway();
    let shipping_method = form.shipping_method;

    OrderRequest {
        payment_method: payment_method.to_string(),
        payment_method_title: payment_method_title.to_string(),
        set_paid: false,
        billing: order_address(form.billing(), true),
        shipping: order_address(&form.shipping_address, false),
        line_items: cart
            .items()
            .iter()
            .map(|item| LineItem {
                product_id: item.product.id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_lines: vec![ShippingLine {
            method_id: shipping_method.method_id().to_string(),
            method_title: shipping_method.label().to_string(),
            total: format!("{:.2}", shipping_method.rate()),
        }],
    }
}

fn order_address(address: &Address, with_contact: bool) -> OrderAddress {
    OrderAddress {
        first_name: trimmed(&address.first_name),
        last_name: trimmed(&address.last_name),
        address_1: trimmed(&address.address_1),
        address_2: address.address_2.as_deref().map(trimmed).unwrap_or_default(),
        city: trimmed(&address.city),
        state: trimmed(&address.state),
        postcode: trimmed(&address.zip),
        country: address.country.trim().to_uppercase(),
        email: with_contact.then(|| trimmed(&address.email)),
        phone: with_contact.then(|| trimmed(&address.phone)),
    }
}

fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::checkout::validation::tests::{valid_address, valid_form};
    use crate::checkout::{PaymentMethod, ShippingMethod};
    use crate::store::{MemoryStorage, ProductSnapshot};
    use hearth_core::{ProductId, StockStatus};

    fn cart_with(items: &[(u64, u32)]) -> CartStore {
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        for &(id, qty) in items {
            let product = ProductSnapshot {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                slug: format!("product-{id}"),
                price: Decimal::new(2000, 2),
                regular_price: None,
                on_sale: false,
                image: None,
                stock_status: StockStatus::InStock,
            };
            cart.add(&product, qty);
        }
        cart
    }

    #[test]
    fn test_build_order_payload() {
        let mut form = valid_form();
        form.shipping_method = ShippingMethod::Express;
        let cart = cart_with(&[(10, 2), (11, 1)]);

        let order = build_order(&form, &cart);
        assert_eq!(order.payment_method, "stripe");
        assert!(!order.set_paid);
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].product_id, ProductId::new(10));
        assert_eq!(order.line_items[0].quantity, 2);
        assert_eq!(order.shipping_lines[0].method_id, "flat_rate");
        assert_eq!(order.shipping_lines[0].total, "9.99");

        assert_eq!(order.billing.email.as_deref(), Some("ada@hearth.test"));
        assert_eq!(order.billing.postcode, "97201");
        assert!(order.shipping.email.is_none());
    }

    #[test]
    fn test_card_details_never_sent() {
        let form = valid_form();
        let json = serde_json::to_string(&build_order(&form, &cart_with(&[(1, 1)]))).unwrap();
        assert!(!json.contains("4242"));
        assert!(!json.contains("cvv"));
    }

    #[test]
    fn test_separate_billing_address() {
        let mut form = valid_form();
        form.payment_method = PaymentMethod::BankTransfer;
        form.billing_address = Some(Address {
            city: "Salem".to_string(),
            email: "billing@hearth.test".to_string(),
            ..valid_address()
        });

        let order = build_order(&form, &cart_with(&[(1, 1)]));
        assert_eq!(order.payment_method, "bacs");
        assert_eq!(order.billing.city, "Salem");
        assert_eq!(order.billing.email.as_deref(), Some("billing@hearth.test"));
        assert_eq!(order.shipping.city, "Portland");
    }

    #[test]
    fn test_receipt_drops_empty_payment_url() {
        let response: OrderResponse = serde_json::from_str(
            r#"{"id": 727, "order_key": "wc_order_abc", "status": "pending", "total": "21.60", "payment_url": ""}"#,
        )
        .unwrap();
        let totals = Totals::compute(Decimal::new(2000, 2), ShippingMethod::Standard);

        let receipt = OrderReceipt::new(response, &totals);
        assert_eq!(receipt.order_id, OrderId::new(727));
        assert_eq!(receipt.total, Decimal::new(2160, 2));
        assert!(receipt.payment_url.is_none());
    }
}
