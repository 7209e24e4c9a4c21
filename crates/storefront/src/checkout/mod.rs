//! Checkout orchestration.
//!
//! A linear state machine over the collected [`CheckoutForm`]:
//!
//! ```text
//! Shipping ──next──▶ Payment ──next──▶ Review ──submit──▶ Submitted
//!    ◀──previous──      ◀──previous──
//! ```
//!
//! `next` is gated by the current step's validator. `submit` re-validates,
//! requires a non-empty cart, and places the order through an
//! [`OrderBackend`]. The machine is a plain value; callers load and store it
//! (see [`CHECKOUT_STORAGE_KEY`]).

pub mod backend;
mod form;
mod order;
mod totals;
pub mod validation;

pub use backend::{Backend, InMemoryBackend, OrderBackend};
pub use form::{Address, CardDetails, CheckoutForm, PaymentMethod};
pub use order::{OrderReceipt, build_order};
pub use totals::{ShippingMethod, TAX_RATE, Totals};
pub use validation::FieldErrors;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::CartStore;
use crate::woocommerce::CommerceError;

/// Session key for the serialized checkout state.
pub const CHECKOUT_STORAGE_KEY: &str = "checkout";

/// A checkout step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
    Submitted,
}

impl CheckoutStep {
    /// Zero-based position in the flow.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Shipping => 0,
            Self::Payment => 1,
            Self::Review => 2,
            Self::Submitted => 3,
        }
    }
}

/// Why a submission did not place an order.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("checkout is not at the review step")]
    NotAtReview,

    #[error("order has already been submitted")]
    AlreadySubmitted,

    #[error("checkout form is invalid")]
    Invalid(FieldErrors),

    #[error("cart is empty")]
    EmptyCart,

    #[error("order backend failed: {0}")]
    Backend(#[from] CommerceError),
}

impl SubmitError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotAtReview => "Please review your order before placing it.",
            Self::AlreadySubmitted => "This order has already been placed.",
            Self::Invalid(_) => "Please correct the highlighted fields.",
            Self::EmptyCart => "Your cart is empty.",
            Self::Backend(e) => e.user_message(),
        }
    }
}

/// Checkout state for one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Checkout {
    step: CheckoutStep,
    form: CheckoutForm,
    #[serde(skip)]
    errors: FieldErrors,
    last_error: Option<String>,
    receipt: Option<OrderReceipt>,
}

impl Checkout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Field errors from the last failed transition.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// User-facing message from the last failed submission.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub const fn receipt(&self) -> Option<&OrderReceipt> {
        self.receipt.as_ref()
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self.step, CheckoutStep::Submitted)
    }

    /// Replace the form data. Returns `false` once the order is submitted.
    pub fn set_form(&mut self, form: CheckoutForm) -> bool {
        if self.is_submitted() {
            return false;
        }
        self.form = form;
        true
    }

    /// Totals for `cart` with the selected shipping tier.
    #[must_use]
    pub fn totals(&self, cart: &CartStore) -> Totals {
        Totals::compute(cart.total(), self.form.shipping_method)
    }

    /// Advance one step if the current step validates.
    ///
    /// `Review` and `Submitted` are left as they are.
    ///
    /// # Errors
    ///
    /// Returns the field errors of the current step; the step is unchanged.
    pub fn next(&mut self) -> Result<CheckoutStep, FieldErrors> {
        let (errors, target) = match self.step {
            CheckoutStep::Shipping => (validation::validate_shipping(&self.form), CheckoutStep::Payment),
            CheckoutStep::Payment => (validation::validate_payment(&self.form), CheckoutStep::Review),
            step @ (CheckoutStep::Review | CheckoutStep::Submitted) => (FieldErrors::new(), step),
        };

        if !errors.is_empty() {
            tracing::debug!(step = ?self.step, fields = errors.len(), "Checkout step failed validation");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors = FieldErrors::new();
        self.step = target;
        Ok(self.step)
    }

    /// Go back one step without validating. Stops at `Shipping`; a submitted
    /// checkout stays submitted.
    pub fn previous(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Shipping | CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
            CheckoutStep::Submitted => CheckoutStep::Submitted,
        };
        self.errors = FieldErrors::new();
        self.last_error = None;
        self.step
    }

    /// Start over with an empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Place the order for `cart`.
    ///
    /// On success the cart is cleared and the checkout moves to
    /// [`CheckoutStep::Submitted`]. On failure the cart is kept and the
    /// checkout stays at review.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout is not at review, the form no longer
    /// validates, the cart is empty (no backend call is made), or the backend
    /// rejects the order.
    pub async fn submit<B: OrderBackend>(
        &mut self,
        cart: &mut CartStore,
        backend: &B,
    ) -> Result<OrderReceipt, SubmitError> {
        match self.step {
            CheckoutStep::Submitted => return Err(SubmitError::AlreadySubmitted),
            CheckoutStep::Review => {}
            CheckoutStep::Shipping | CheckoutStep::Payment => return Err(SubmitError::NotAtReview),
        }

        let mut errors = validation::validate_shipping(&self.form);
        errors.extend(validation::validate_payment(&self.form));
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }

        if cart.is_empty() {
            let err = SubmitError::EmptyCart;
            self.last_error = Some(err.user_message().to_string());
            return Err(err);
        }

        let totals = self.totals(cart);
        let order = build_order(&self.form, cart);

        match backend.create_order(&order).await {
            Ok(response) => {
                let receipt = OrderReceipt::new(response, &totals);
                tracing::info!(order_id = %receipt.order_id, total = %receipt.total, "Order placed");

                cart.clear();
                self.step = CheckoutStep::Submitted;
                self.errors = FieldErrors::new();
                self.last_error = None;
                self.receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order submission failed");
                let err = SubmitError::from(e);
                self.last_error = Some(err.user_message().to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::validation::tests::valid_form;
    use super::*;
    use crate::store::{MemoryStorage, ProductSnapshot};
    use hearth_core::{ProductId, StockStatus};

    fn cart(items: &[(u64, i64, u32)]) -> CartStore {
        let mut cart = CartStore::load(Arc::new(MemoryStorage::new()));
        for &(id, cents, qty) in items {
            let product = ProductSnapshot {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                slug: format!("product-{id}"),
                price: Decimal::new(cents, 2),
                regular_price: None,
                on_sale: false,
                image: None,
                stock_status: StockStatus::InStock,
            };
            cart.add(&product, qty);
        }
        cart
    }

    fn at_review() -> Checkout {
        let mut checkout = Checkout::new();
        checkout.set_form(valid_form());
        checkout.next().unwrap();
        checkout.next().unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Review);
        checkout
    }

    #[test]
    fn test_invalid_email_blocks_shipping_step() {
        let mut checkout = Checkout::new();
        let mut form = valid_form();
        form.shipping_address.email = "not-an-email".to_string();
        checkout.set_form(form);

        let errors = checkout.next().unwrap_err();
        assert!(errors.contains("shippingAddress.email"));
        assert_eq!(checkout.step().index(), 0);
        assert!(checkout.errors().contains("shippingAddress.email"));
    }

    #[test]
    fn test_next_walks_to_review_and_stays() {
        let mut checkout = Checkout::new();
        checkout.set_form(valid_form());

        assert_eq!(checkout.next().unwrap(), CheckoutStep::Payment);
        assert_eq!(checkout.next().unwrap(), CheckoutStep::Review);
        assert_eq!(checkout.next().unwrap(), CheckoutStep::Review);
    }

    #[test]
    fn test_payment_step_validates_card() {
        let mut checkout = Checkout::new();
        let mut form = valid_form();
        form.payment_method = PaymentMethod::Card(CardDetails::default());
        checkout.set_form(form);

        checkout.next().unwrap();
        let errors = checkout.next().unwrap_err();
        assert!(errors.contains("paymentMethod.cardNumber"));
        assert_eq!(checkout.step(), CheckoutStep::Payment);
    }

    #[test]
    fn test_previous_saturates_and_clears_errors() {
        let mut checkout = Checkout::new();
        checkout.next().unwrap_err();
        assert!(!checkout.errors().is_empty());

        assert_eq!(checkout.previous(), CheckoutStep::Shipping);
        assert!(checkout.errors().is_empty());

        let mut checkout = at_review();
        assert_eq!(checkout.previous(), CheckoutStep::Payment);
        assert_eq!(checkout.previous(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_previous_does_not_revalidate() {
        let mut checkout = at_review();
        let mut form = checkout.form().clone();
        form.shipping_address.zip = "bad".to_string();
        checkout.set_form(form);

        assert_eq!(checkout.previous(), CheckoutStep::Payment);
    }

    #[test]
    fn test_totals_example() {
        let checkout = Checkout::new();
        let totals = checkout.totals(&cart(&[(1, 5000, 2)]));
        assert_eq!(totals.subtotal, Decimal::new(10000, 2));
        assert_eq!(totals.tax, Decimal::new(800, 2));
        assert_eq!(totals.total, Decimal::new(10800, 2));
    }

    #[tokio::test]
    async fn test_submit_success_clears_cart() {
        let mut checkout = at_review();
        let mut cart = cart(&[(1, 5000, 2)]);
        let backend = InMemoryBackend::new();

        let receipt = checkout.submit(&mut cart, &backend).await.unwrap();
        assert_eq!(receipt.total, Decimal::new(10800, 2));
        assert_eq!(checkout.step(), CheckoutStep::Submitted);
        assert_eq!(checkout.receipt(), Some(&receipt));
        assert!(cart.is_empty());
        assert_eq!(backend.calls(), 1);
        assert_eq!(backend.orders()[0].line_items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_submit_empty_cart_makes_no_backend_call() {
        let mut checkout = at_review();
        let mut cart = cart(&[]);
        let backend = InMemoryBackend::new();

        let err = checkout.submit(&mut cart, &backend).await.unwrap_err();
        assert!(matches!(err, SubmitError::EmptyCart));
        assert_eq!(backend.calls(), 0);
        assert_eq!(checkout.step(), CheckoutStep::Review);
        assert_eq!(checkout.last_error(), Some("Your cart is empty."));
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_cart_at_review() {
        let mut checkout = at_review();
        let mut cart = cart(&[(1, 1000, 1)]);
        let backend = InMemoryBackend::new().failing(503);

        let err = checkout.submit(&mut cart, &backend).await.unwrap_err();
        assert!(matches!(err, SubmitError::Backend(_)));
        assert_eq!(checkout.step(), CheckoutStep::Review);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(
            checkout.last_error(),
            Some(crate::woocommerce::status_message(503))
        );

        // Retry against a healthy backend
        let healthy = InMemoryBackend::new();
        checkout.submit(&mut cart, &healthy).await.unwrap();
        assert!(checkout.is_submitted());
        assert!(checkout.last_error().is_none());
    }

    #[tokio::test]
    async fn test_submit_requires_review() {
        let mut checkout = Checkout::new();
        checkout.set_form(valid_form());
        let mut cart = cart(&[(1, 1000, 1)]);
        let backend = InMemoryBackend::new();

        let err = checkout.submit(&mut cart, &backend).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotAtReview));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_revalidates_form() {
        let mut checkout = at_review();
        checkout.form.shipping_address.phone = "123".to_string();
        let mut cart = cart(&[(1, 1000, 1)]);
        let backend = InMemoryBackend::new();

        let err = checkout.submit(&mut cart, &backend).await.unwrap_err();
        let SubmitError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.contains("shippingAddress.phone"));
        assert_eq!(backend.calls(), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_submitted_checkout_is_locked() {
        let mut checkout = at_review();
        let mut cart = cart(&[(1, 1000, 1)]);
        let backend = InMemoryBackend::new();
        checkout.submit(&mut cart, &backend).await.unwrap();

        assert!(!checkout.set_form(CheckoutForm::default()));
        assert_eq!(checkout.previous(), CheckoutStep::Submitted);
        let err = checkout.submit(&mut cart, &backend).await.unwrap_err();
        assert!(matches!(err, SubmitError::AlreadySubmitted));
        assert_eq!(backend.calls(), 1);

        checkout.reset();
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
        assert!(checkout.receipt().is_none());
    }

    #[test]
    fn test_state_roundtrips_through_json() {
        let checkout = at_review();
        let json = serde_json::to_string(&checkout).unwrap();
        let restored: Checkout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, checkout);
    }
}
