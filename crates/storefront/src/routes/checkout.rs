//! Checkout route handlers.
//!
//! Each handler loads the shopper's checkout from the session, applies one
//! transition, and saves it back before responding.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::checkout::{
    Checkout, CheckoutForm, CheckoutStep, FieldErrors, OrderReceipt, PaymentMethod,
    ShippingMethod, Totals,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::Shopper;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// A selectable shipping tier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionView {
    pub method: ShippingMethod,
    pub label: &'static str,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
}

/// Checkout display data.
///
/// Card numbers are masked to their last four digits and the CVV is never
/// echoed back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub current_step: u8,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    pub last_error: Option<String>,
    pub receipt: Option<OrderReceipt>,
    pub totals: Totals,
    pub shipping_options: Vec<ShippingOptionView>,
    pub item_count: u64,
}

impl CheckoutView {
    fn new(checkout: &Checkout, totals: Totals, item_count: u64) -> Self {
        Self {
            step: checkout.step(),
            current_step: checkout.step().index(),
            form: masked(checkout.form()),
            errors: checkout.errors().clone(),
            last_error: checkout.last_error().map(String::from),
            receipt: checkout.receipt().cloned(),
            totals,
            shipping_options: ShippingMethod::ALL
                .iter()
                .map(|&method| ShippingOptionView {
                    method,
                    label: method.label(),
                    rate: method.rate(),
                })
                .collect(),
            item_count,
        }
    }
}

fn masked(form: &CheckoutForm) -> CheckoutForm {
    let mut form = form.clone();
    if let PaymentMethod::Card(card) = &mut form.payment_method {
        let digits: Vec<char> = card
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        card.card_number = if digits.len() > 4 {
            let mut last4: Vec<char> = digits.iter().rev().take(4).copied().collect();
            last4.reverse();
            format!("**** {}", last4.into_iter().collect::<String>())
        } else {
            digits.into_iter().collect()
        };
        card.cvv = String::new();
    }
    form
}

// =============================================================================
// Helpers
// =============================================================================

/// Save the checkout, flush the session, and render the view.
async fn respond(shopper: &Shopper, checkout: &Checkout) -> CheckoutView {
    shopper.save_checkout(checkout);
    shopper.finish().await;
    let cart = shopper.cart();
    CheckoutView::new(checkout, checkout.totals(&cart), cart.item_count())
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the checkout.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn show(shopper: Shopper) -> Json<CheckoutView> {
    let checkout = shopper.checkout();
    Json(respond(&shopper, &checkout).await)
}

/// Replace the collected form data.
#[instrument(skip(shopper, form), fields(shopper_id = %shopper.id()))]
pub async fn update_form(shopper: Shopper, Json(form): Json<CheckoutForm>) -> Result<Json<CheckoutView>> {
    let mut checkout = shopper.checkout();
    if !checkout.set_form(form) {
        shopper.finish().await;
        return Err(AppError::Conflict(
            "This order has already been placed.".to_string(),
        ));
    }
    Ok(Json(respond(&shopper, &checkout).await))
}

/// Advance to the next step if the current one validates.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn next(shopper: Shopper) -> Result<Json<CheckoutView>> {
    let mut checkout = shopper.checkout();
    let result = checkout.next();
    let view = respond(&shopper, &checkout).await;

    match result {
        Ok(step) => {
            tracing::debug!(?step, "Checkout advanced");
            Ok(Json(view))
        }
        Err(errors) => {
            let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
            tracing::debug!(?fields, step = ?checkout.step(), "Checkout step is invalid");
            Err(AppError::Validation(errors))
        }
    }
}

/// Go back one step.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn previous(shopper: Shopper) -> Json<CheckoutView> {
    let mut checkout = shopper.checkout();
    checkout.previous();
    Json(respond(&shopper, &checkout).await)
}

/// Start over with an empty form.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn reset(shopper: Shopper) -> Json<CheckoutView> {
    let mut checkout = shopper.checkout();
    checkout.reset();
    Json(respond(&shopper, &checkout).await)
}

/// Place the order.
///
/// Only one submission per shopper runs at a time; a second one arriving
/// while the first is in flight gets `409 Conflict` and never reaches the
/// order backend.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id()))]
pub async fn submit(State(state): State<AppState>, shopper: Shopper) -> Result<Response> {
    let Some(_guard) = state.submissions().try_acquire(shopper.id()) else {
        return Err(AppError::Conflict(
            "Your order is already being placed.".to_string(),
        ));
    };

    let mut checkout = shopper.checkout();
    let mut cart = shopper.cart();
    let result = checkout.submit(&mut cart, state.orders()).await;
    shopper.save_checkout(&checkout);
    shopper.finish().await;

    let receipt = result.map_err(AppError::from)?;
    let order_id = receipt.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    let view = CheckoutView::new(&checkout, checkout.totals(&cart), cart.item_count());
    Ok(Json(view).into_response())
}
