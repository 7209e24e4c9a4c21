//! Cart route handlers.
//!
//! The cart lives in the shopper's session. Adding an item looks the product up
//! in the catalog and keeps a snapshot of it; later changes only touch the
//! session.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hearth_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::Shopper;
use crate::state::AppState;
use crate::store::{AddOutcome, CartItem, CartStore, ProductSnapshot};

// =============================================================================
// Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product: ProductSnapshot,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
    pub added_at: DateTime<Utc>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product: item.product.clone(),
            quantity: item.quantity,
            line_total: item.line_total(),
            added_at: item.added_at,
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            subtotal: cart.total(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn show(shopper: Shopper) -> Json<CartView> {
    let cart = shopper.cart();
    shopper.finish().await;
    Json(CartView::from(&cart))
}

/// Add a product to the cart.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id()))]
pub async fn add(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let product = state
        .catalog()
        .get_product(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", request.product_id)))?;

    let mut cart = shopper.cart();
    let outcome = cart.add(&ProductSnapshot::from(&product), quantity);
    shopper.finish().await;

    match outcome {
        AddOutcome::Inserted | AddOutcome::Merged { .. } => {
            let product_id = product.id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
            Ok(Json(CartView::from(&cart)))
        }
        AddOutcome::OutOfStock => Err(AppError::Conflict(format!(
            "{} is out of stock",
            product.name
        ))),
        AddOutcome::Ignored => Ok(Json(CartView::from(&cart))),
    }
}

/// Set the quantity of a cart line; zero or less removes it.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn update(
    shopper: Shopper,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = shopper.cart();
    let changed = cart.set_quantity(product_id, request.quantity);
    shopper.finish().await;

    if !changed && request.quantity > 0 {
        return Err(AppError::NotFound(format!("Product {product_id} is not in the cart")));
    }
    Ok(Json(CartView::from(&cart)))
}

/// Remove a cart line.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn remove(shopper: Shopper, Path(product_id): Path<ProductId>) -> Json<CartView> {
    let mut cart = shopper.cart();
    cart.remove(product_id);
    shopper.finish().await;
    Json(CartView::from(&cart))
}

/// Empty the cart.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn clear(shopper: Shopper) -> Json<CartView> {
    let mut cart = shopper.cart();
    cart.clear();
    shopper.finish().await;
    Json(CartView::from(&cart))
}
