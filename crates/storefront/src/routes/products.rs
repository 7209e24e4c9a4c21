//! Catalog route handlers: products and categories.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hearth_core::{CategoryId, ProductId, StockStatus};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::woocommerce::{Category, Product, ProductFilter, ProductPage, ProductSort};

// =============================================================================
// Views
// =============================================================================

/// Image display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub src: String,
    pub alt: String,
}

/// Category reference shown on a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRefView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Product display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub permalink: String,
    pub description: String,
    pub short_description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub regular_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub sale_price: Option<Decimal>,
    pub on_sale: bool,
    pub featured: bool,
    pub stock_status: StockStatus,
    pub purchasable: bool,
    pub categories: Vec<CategoryRefView>,
    pub images: Vec<ImageView>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub average_rating: Option<Decimal>,
    pub rating_count: u32,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            permalink: product.permalink.clone(),
            description: product.description.clone(),
            short_description: product.short_description.clone(),
            price: product.price,
            regular_price: product.regular_price,
            sale_price: product.sale_price,
            on_sale: product.on_sale,
            featured: product.featured,
            stock_status: product.stock_status,
            purchasable: product.stock_status.is_purchasable(),
            categories: product
                .categories
                .iter()
                .map(|c| CategoryRefView {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                })
                .collect(),
            images: product
                .images
                .iter()
                .map(|img| ImageView {
                    src: img.src.clone(),
                    alt: if img.alt.is_empty() {
                        product.name.clone()
                    } else {
                        img.alt.clone()
                    },
                })
                .collect(),
            average_rating: product.average_rating,
            rating_count: product.rating_count,
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub total: u64,
    pub total_pages: u32,
    pub page: u32,
    pub per_page: u32,
    pub has_more_pages: bool,
}

impl From<&ProductPage> for ProductListView {
    fn from(page: &ProductPage) -> Self {
        Self {
            products: page.products.iter().map(ProductView::from).collect(),
            total: page.total,
            total_pages: page.total_pages,
            page: page.page,
            per_page: page.per_page,
            has_more_pages: page.page < page.total_pages,
        }
    }
}

/// Category display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Parent category ID, absent for top-level categories.
    pub parent: Option<CategoryId>,
    pub description: String,
    pub count: u32,
    pub image: Option<ImageView>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent: (category.parent != 0).then(|| CategoryId::new(category.parent)),
            description: category.description.clone(),
            count: category.count,
            image: category.image.as_ref().map(|img| ImageView {
                src: img.src.clone(),
                alt: img.alt.clone(),
            }),
        }
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Product listing query parameters.
///
/// `category` and `tags` take comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
}

impl ProductQuery {
    /// Convert to a catalog filter.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if a price bound is not a decimal number.
    pub fn into_filter(self) -> Result<ProductFilter> {
        Ok(ProductFilter {
            page: self.page,
            per_page: self.per_page,
            search: self.search,
            categories: split_list(self.category.as_deref()),
            tags: split_list(self.tags.as_deref()),
            min_price: parse_price("min_price", self.min_price.as_deref())?,
            max_price: parse_price("max_price", self.max_price.as_deref())?,
            sort: self.sort.as_deref().and_then(ProductSort::parse),
            on_sale: self.on_sale.unwrap_or(false),
            featured: self.featured.unwrap_or(false),
            in_stock: self.in_stock.unwrap_or(false),
        })
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_price(name: &str, raw: Option<&str>) -> Result<Option<Decimal>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => Decimal::from_str(value)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{name} must be a number"))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListView>> {
    let filter = query.into_filter()?;
    let page = state.catalog().list_products(&filter).await?;
    Ok(Json(ProductListView::from(&page)))
}

/// Show a product by ID.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state
        .catalog()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;
    Ok(Json(ProductView::from(&product)))
}

/// Show a product by slug.
#[instrument(skip(state))]
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let product = state
        .catalog()
        .get_product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{slug}'")))?;
    Ok(Json(ProductView::from(&product)))
}

/// List categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(Json(categories.iter().map(CategoryView::from).collect()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::routes::test_support::TestApp;

    #[test]
    fn test_query_into_filter() {
        let query = ProductQuery {
            category: Some("hoodies, mugs,,".to_string()),
            tags: Some("3,x".to_string()),
            min_price: Some("10".to_string()),
            sort: Some("price-desc".to_string()),
            in_stock: Some(true),
            ..ProductQuery::default()
        };

        let filter = query.into_filter().unwrap();
        assert_eq!(filter.categories, vec!["hoodies", "mugs"]);
        assert_eq!(filter.tags, vec!["3", "x"]);
        assert_eq!(filter.min_price, Some(Decimal::from(10)));
        assert_eq!(filter.sort, Some(ProductSort::PriceDesc));
        assert!(filter.in_stock);
        assert!(!filter.on_sale);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let query = ProductQuery {
            max_price: Some("cheap".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_category_view_parent() {
        let category = Category {
            id: CategoryId::new(5),
            name: "Hoodies".to_string(),
            slug: "hoodies".to_string(),
            parent: 0,
            description: String::new(),
            count: 3,
            image: None,
        };
        assert!(CategoryView::from(&category).parent.is_none());

        let child = Category { parent: 5, ..category };
        assert_eq!(CategoryView::from(&child).parent, Some(CategoryId::new(5)));
    }

    #[tokio::test]
    async fn test_unconfigured_catalog_lists_nothing() {
        let app = TestApp::new();

        let (status, body) = app.request(Method::GET, "/api/products?category=hoodies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"], serde_json::json!([]));
        assert_eq!(body["total"], 0);
        assert_eq!(body["perPage"], 12);

        let (status, body) = app.request(Method::GET, "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let app = TestApp::new();
        let (status, body) = app.request(Method::GET, "/api/products/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("42"));

        let (status, _) = app.request(Method::GET, "/api/products/slug/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
