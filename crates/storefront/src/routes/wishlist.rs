//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use hearth_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::Shopper;
use crate::routes::cart::CartView;
use crate::state::AppState;
use crate::store::{AddOutcome, ProductSnapshot, ToggleOutcome, WishlistItem, WishlistStore};

// =============================================================================
// Views
// =============================================================================

/// Saved product display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemView {
    pub product: ProductSnapshot,
    pub added_at: DateTime<Utc>,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            product: item.product.clone(),
            added_at: item.added_at,
        }
    }
}

/// Wishlist display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub items: Vec<WishlistItemView>,
    pub count: usize,
}

impl From<&WishlistStore> for WishlistView {
    fn from(wishlist: &WishlistStore) -> Self {
        Self {
            items: wishlist.items().iter().map(WishlistItemView::from).collect(),
            count: wishlist.len(),
        }
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleView {
    pub product_id: ProductId,
    pub in_wishlist: bool,
    /// `None` when the toggle was collapsed into one already in flight.
    pub outcome: Option<ToggleOutcome>,
    pub count: usize,
}

/// Cart and wishlist after moving an item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartView {
    pub cart: CartView,
    pub wishlist: WishlistView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the wishlist.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn show(shopper: Shopper) -> Json<WishlistView> {
    let wishlist = shopper.wishlist();
    shopper.finish().await;
    Json(WishlistView::from(&wishlist))
}

/// Toggle a product's membership.
///
/// A toggle for the same shopper and product that arrives while another is
/// still running is collapsed: nothing changes and the current membership is
/// returned with `409 Conflict`.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id()))]
pub async fn toggle(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    let Some(_guard) = state
        .wishlist_toggles()
        .try_acquire((shopper.id(), product_id))
    else {
        tracing::debug!(%product_id, "Collapsing overlapping wishlist toggle");
        let wishlist = shopper.wishlist();
        let view = ToggleView {
            product_id,
            in_wishlist: wishlist.is_member(product_id),
            outcome: None,
            count: wishlist.len(),
        };
        return Ok((StatusCode::CONFLICT, Json(view)).into_response());
    };

    let mut wishlist = shopper.wishlist();
    let outcome = if wishlist.remove(product_id) {
        ToggleOutcome::Removed
    } else {
        let product = state
            .catalog()
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {product_id}")))?;
        wishlist.toggle(&ProductSnapshot::from(&product))
    };
    shopper.finish().await;

    let view = ToggleView {
        product_id,
        in_wishlist: matches!(outcome, ToggleOutcome::Added),
        outcome: Some(outcome),
        count: wishlist.len(),
    };
    Ok(Json(view).into_response())
}

/// Remove a product from the wishlist.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id()))]
pub async fn remove(shopper: Shopper, Path(product_id): Path<ProductId>) -> Json<WishlistView> {
    let mut wishlist = shopper.wishlist();
    wishlist.remove(product_id);
    shopper.finish().await;
    Json(WishlistView::from(&wishlist))
}

/// Move a saved product into the cart with quantity 1.
///
/// The product is refreshed from the catalog when possible so the cart gets
/// the current price and stock status.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id()))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MoveToCartView>> {
    let mut wishlist = shopper.wishlist();
    let saved = wishlist
        .get(product_id)
        .map(|item| item.product.clone())
        .ok_or_else(|| AppError::NotFound(format!("Product {product_id} is not in the wishlist")))?;

    let snapshot = match state.catalog().get_product(product_id).await {
        Ok(Some(product)) => ProductSnapshot::from(&product),
        Ok(None) => saved,
        Err(e) => {
            tracing::warn!(error = %e, %product_id, "Using saved product data for move to cart");
            saved
        }
    };

    let mut cart = shopper.cart();
    if cart.add(&snapshot, 1) == AddOutcome::OutOfStock {
        return Err(AppError::Conflict(format!("{} is out of stock", snapshot.name)));
    }
    wishlist.remove(product_id);
    shopper.finish().await;

    Ok(Json(MoveToCartView {
        cart: CartView::from(&cart),
        wishlist: WishlistView::from(&wishlist),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_empty_wishlist_view() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/api/wishlist", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"items": [], "count": 0}));
    }

    #[tokio::test]
    async fn test_toggle_unknown_product_is_not_found() {
        let app = TestApp::new();
        let (status, _) = app
            .request(Method::POST, "/api/wishlist/3/toggle", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // The in-flight entry is released even though the toggle failed
        let (status, _) = app
            .request(Method::POST, "/api/wishlist/3/toggle", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_move_missing_item_is_not_found() {
        let app = TestApp::new();
        let (status, _) = app
            .request(Method::POST, "/api/wishlist/3/move-to-cart", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
