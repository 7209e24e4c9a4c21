//! Per-step field validation.
//!
//! Errors are collected into a [`FieldErrors`] map keyed by the camelCase path
//! of the offending field, e.g. `shippingAddress.email`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use hearth_core::Email;

use crate::checkout::{Address, CardDetails, CheckoutForm, PaymentMethod};

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("Invalid regex"));
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("Invalid regex"));

/// Minimum number of digits in a phone number.
const MIN_PHONE_DIGITS: usize = 10;

/// Field path → message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// Steps
// =============================================================================

/// Validate the shipping step: the shipping address and, when given, a
/// separate billing address.
#[must_use]
pub fn validate_shipping(form: &CheckoutForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validate_address(&form.shipping_address, "shippingAddress", &mut errors);
    if let Some(billing) = &form.billing_address {
        validate_address(billing, "billingAddress", &mut errors);
    }
    errors
}

/// Validate the payment step. Only card payments carry fields to check.
#[must_use]
pub fn validate_payment(form: &CheckoutForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let PaymentMethod::Card(card) = &form.payment_method {
        validate_card(card, "paymentMethod", &mut errors);
    }
    errors
}

// =============================================================================
// Fields
// =============================================================================

fn validate_address(address: &Address, prefix: &str, errors: &mut FieldErrors) {
    let required = [
        ("firstName", &address.first_name, "First name is required"),
        ("lastName", &address.last_name, "Last name is required"),
        ("address1", &address.address_1, "Street address is required"),
        ("city", &address.city, "City is required"),
        ("state", &address.state, "State is required"),
        ("country", &address.country, "Country is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            errors.insert(format!("{prefix}.{field}"), message);
        }
    }

    let email = address.email.trim();
    if email.is_empty() {
        errors.insert(format!("{prefix}.email"), "Email is required");
    } else if Email::parse(email).is_err() {
        errors.insert(format!("{prefix}.email"), "Enter a valid email address");
    }

    let phone = address.phone.trim();
    if phone.is_empty() {
        errors.insert(format!("{prefix}.phone"), "Phone number is required");
    } else if digits(phone).len() < MIN_PHONE_DIGITS {
        errors.insert(
            format!("{prefix}.phone"),
            "Phone number must have at least 10 digits",
        );
    }

    let zip = address.zip.trim();
    if zip.is_empty() {
        errors.insert(format!("{prefix}.zip"), "ZIP code is required");
    } else if !ZIP_RE.is_match(zip) {
        errors.insert(format!("{prefix}.zip"), "Enter a valid ZIP code");
    }
}

fn validate_card(card: &CardDetails, prefix: &str, errors: &mut FieldErrors) {
    let number: String = card
        .card_number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if number.is_empty() {
        errors.insert(format!("{prefix}.cardNumber"), "Card number is required");
    } else if !number.chars().all(|c| c.is_ascii_digit()) || !(13..=19).contains(&number.len()) {
        errors.insert(format!("{prefix}.cardNumber"), "Enter a valid card number");
    }

    if card.cardholder_name.trim().is_empty() {
        errors.insert(
            format!("{prefix}.cardholderName"),
            "Cardholder name is required",
        );
    }

    match card.expiry_month {
        None => errors.insert(format!("{prefix}.expiryMonth"), "Expiry month is required"),
        Some(month) if !(1..=12).contains(&month) => {
            errors.insert(format!("{prefix}.expiryMonth"), "Enter a valid month");
        }
        Some(_) => {}
    }
    if card.expiry_year.is_none() {
        errors.insert(format!("{prefix}.expiryYear"), "Expiry year is required");
    }

    let cvv = card.cvv.trim();
    if cvv.is_empty() {
        errors.insert(format!("{prefix}.cvv"), "CVV is required");
    } else if !CVV_RE.is_match(cvv) {
        errors.insert(format!("{prefix}.cvv"), "Enter a valid CVV");
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}
