//! Integration tests for the session-backed cart and wishlist.

use std::time::Duration;

use hearth_integration_tests::TestStorefront;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

async fn add_to_cart(app: &TestStorefront, product_id: u64, quantity: u32) -> (StatusCode, Value) {
    app.send(
        Method::POST,
        "/api/cart/items",
        Some(json!({"productId": product_id, "quantity": quantity})),
    )
    .await
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let app = TestStorefront::start().await;

    let (status, _) = add_to_cart(&app, 101, 1).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = add_to_cart(&app, 101, 2).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["lineTotal"], "149.97");
    assert_eq!(body["itemCount"], 3);
    assert_eq!(body["subtotal"], "149.97");
}

#[tokio::test]
async fn test_cart_survives_between_requests() {
    let app = TestStorefront::start().await;

    add_to_cart(&app, 101, 1).await;
    add_to_cart(&app, 201, 2).await;

    let (status, body) = app.get("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["product"]["id"], 101);
    assert_eq!(body["items"][1]["product"]["id"], 201);
    assert_eq!(body["subtotal"], "73.99");
}

#[tokio::test]
async fn test_separate_shoppers_have_separate_carts() {
    let first = TestStorefront::start().await;
    add_to_cart(&first, 101, 1).await;

    let other = reqwest::Client::new();
    let body: Value = other
        .get(first.url("/api/cart"))
        .send()
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_out_of_stock_product_is_rejected() {
    let app = TestStorefront::start().await;

    let (status, body) = add_to_cart(&app, 102, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("Ash Hoodie")));

    let (_, cart) = app.get("/api/cart").await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn test_quantity_updates_and_removal() {
    let app = TestStorefront::start().await;
    add_to_cart(&app, 101, 1).await;
    add_to_cart(&app, 201, 1).await;

    let (status, body) = app
        .send(Method::PUT, "/api/cart/items/201", Some(json!({"quantity": 4})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itemCount"], 5);

    let (_, body) = app
        .send(Method::PUT, "/api/cart/items/201", Some(json!({"quantity": -1})))
        .await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));

    let (_, body) = app.send(Method::DELETE, "/api/cart/items/101", None).await;
    assert_eq!(body["items"], json!([]));

    add_to_cart(&app, 101, 2).await;
    let (_, body) = app.send(Method::DELETE, "/api/cart", None).await;
    assert_eq!(body["itemCount"], 0);
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let app = TestStorefront::start().await;

    let (status, body) = app.post("/api/wishlist/201/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inWishlist"], true);
    assert_eq!(body["outcome"], "added");
    assert_eq!(body["count"], 1);

    let (_, body) = app.get("/api/wishlist").await;
    assert_eq!(body["items"][0]["product"]["slug"], "hearth-mug");

    let (status, body) = app.post("/api/wishlist/201/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inWishlist"], false);
    assert_eq!(body["outcome"], "removed");
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_overlapping_toggles_collapse() {
    let app = TestStorefront::start().await;
    // Establish the session so both toggles belong to one shopper
    app.get("/api/wishlist").await;
    app.upstream.delay_product_lookups(Duration::from_millis(300));

    let (first, second) = tokio::join!(
        app.post("/api/wishlist/101/toggle"),
        app.post("/api/wishlist/101/toggle"),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort_by_key(StatusCode::as_u16);
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let (_, body) = app.get("/api/wishlist").await;
    assert_eq!(body["count"], 1);
    assert_eq!(
        app.upstream
            .requests_to("GET", "/wp-json/wc/v3/products/101")
            .len(),
        1
    );
}

#[tokio::test]
async fn test_move_to_cart() {
    let app = TestStorefront::start().await;
    app.post("/api/wishlist/201/toggle").await;
    app.post("/api/wishlist/101/toggle").await;

    let (status, body) = app.post("/api/wishlist/201/move-to-cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"][0]["product"]["id"], 201);
    assert_eq!(body["cart"]["items"][0]["quantity"], 1);
    assert_eq!(body["wishlist"]["count"], 1);
    assert_eq!(body["wishlist"]["items"][0]["product"]["id"], 101);

    let (status, _) = app.post("/api/wishlist/201/move-to-cart").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_out_of_stock_item_stays_on_wishlist() {
    let app = TestStorefront::start().await;
    app.post("/api/wishlist/102/toggle").await;

    let (status, _) = app.post("/api/wishlist/102/move-to-cart").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, wishlist) = app.get("/api/wishlist").await;
    assert_eq!(wishlist["count"], 1);
    let (_, cart) = app.get("/api/cart").await;
    assert_eq!(cart["items"], json!([]));
}
