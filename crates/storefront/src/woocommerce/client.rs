//! WooCommerce REST API client implementation.

use std::str::FromStr;
use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use hearth_core::ProductId;

use crate::config::WooCommerceConfig;
use crate::woocommerce::CommerceError;
use crate::woocommerce::cache::{CacheKey, CacheValue, CatalogExpiry};
use crate::woocommerce::query::{ProductFilter, UpstreamQuery, build_product_query};
use crate::woocommerce::types::{Category, OrderRequest, OrderResponse, Product, ProductPage};

/// Page size used when walking the category listing.
const CATEGORY_PAGE_SIZE: u32 = 100;

/// Safety cap on category pages fetched in one refresh.
const MAX_CATEGORY_PAGES: u32 = 20;

// =============================================================================
// WooCommerceClient
// =============================================================================

/// Client for the WooCommerce REST API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct WooCommerceClient {
    inner: Arc<WooCommerceClientInner>,
}

struct WooCommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
    cache: Cache<CacheKey, CacheValue>,
}

struct Credentials {
    consumer_key: SecretString,
    consumer_secret: SecretString,
}

impl std::fmt::Debug for WooCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceClient")
            .field("base_url", &self.inner.base_url)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl WooCommerceClient {
    /// Create a new WooCommerce API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &WooCommerceConfig) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hearth-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .expire_after(CatalogExpiry {
                category_ttl: config.category_cache_ttl,
            })
            .build();

        let base_url = format!(
            "{}/wp-json/wc/v3",
            config.store_url.as_str().trim_end_matches('/')
        );

        let credentials = match (&config.consumer_key, &config.consumer_secret) {
            (Some(key), Some(secret)) => Some(Credentials {
                consumer_key: key.clone(),
                consumer_secret: secret.clone(),
            }),
            _ => {
                warn!("WooCommerce credentials not set; catalog requests will return empty results");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(WooCommerceClientInner {
                client,
                base_url,
                credentials,
                cache,
            }),
        })
    }

    /// Whether both API credentials are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.credentials.is_some()
    }

    /// Build an authenticated request, or `None` when credentials are unset.
    fn request(&self, method: Method, path: &str) -> Option<RequestBuilder> {
        let credentials = self.inner.credentials.as_ref()?;
        let url = format!("{}{path}", self.inner.base_url);
        Some(self.inner.client.request(method, url).basic_auth(
            credentials.consumer_key.expose_secret(),
            Some(credentials.consumer_secret.expose_secret()),
        ))
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(T, HeaderMap), CommerceError> {
        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "WooCommerce API returned non-success status"
            );
            return Err(CommerceError::Status {
                status: status.as_u16(),
                body: truncate(&response_text, 200),
            });
        }

        let value = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text, 500),
                "Failed to parse WooCommerce response"
            );
            CommerceError::Parse(e)
        })?;

        Ok((value, headers))
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get every product category.
    ///
    /// The listing is cached for the configured category TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<[Category]>, CommerceError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let mut categories: Vec<Category> = Vec::new();
        let mut page = 1;
        loop {
            let Some(request) = self.request(Method::GET, "/products/categories") else {
                warn!("Skipping category listing: credentials not configured");
                return Ok(Arc::from(Vec::new()));
            };

            let request = request.query(&[
                ("per_page", CATEGORY_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
                ("hide_empty", "false".to_string()),
            ]);
            let (batch, headers): (Vec<Category>, _) = self.send(request).await?;

            let total_pages = header_number::<u32>(&headers, "x-wp-totalpages").unwrap_or(1);
            let fetched = batch.len();
            categories.extend(batch);

            if page >= total_pages || page >= MAX_CATEGORY_PAGES || fetched == 0 {
                break;
            }
            page += 1;
        }

        let categories: Arc<[Category]> = Arc::from(categories);
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a filtered, paginated product listing.
    ///
    /// Category slugs in the filter are resolved to IDs through the (cached)
    /// category listing; slugs that match nothing are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, CommerceError> {
        let page = filter.page();
        let per_page = filter.per_page();

        if !self.is_configured() {
            warn!("Skipping product listing: credentials not configured");
            return Ok(ProductPage::empty(page, per_page));
        }

        let categories = if filter.needs_categories() {
            self.list_categories().await?
        } else {
            Arc::from(Vec::new())
        };

        let params = match build_product_query(filter, &categories) {
            UpstreamQuery::Params(params) => params,
            UpstreamQuery::NoMatch => {
                debug!("No requested category exists upstream");
                return Ok(ProductPage::empty(page, per_page));
            }
        };

        let Some(request) = self.request(Method::GET, "/products") else {
            return Ok(ProductPage::empty(page, per_page));
        };
        let (products, headers): (Vec<Product>, _) = self.send(request.query(&params)).await?;

        let total = header_number::<u64>(&headers, "x-wp-total").unwrap_or(products.len() as u64);
        let total_pages = header_number::<u32>(&headers, "x-wp-totalpages")
            .unwrap_or_else(|| u32::from(!products.is_empty()));

        Ok(ProductPage {
            products,
            total,
            total_pages,
            page,
            per_page,
        })
    }

    /// Get a product by its numeric ID.
    ///
    /// Returns `Ok(None)` if the product does not exist or credentials are unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(request) = self.request(Method::GET, &format!("/products/{id}")) else {
            warn!("Skipping product lookup: credentials not configured");
            return Ok(None);
        };

        let product: Product = match self.send(request).await {
            Ok((product, _)) => product,
            Err(CommerceError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CommerceError> {
        let cache_key = CacheKey::ProductSlug(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product slug");
            return Ok(Some(*product));
        }

        let Some(request) = self.request(Method::GET, "/products") else {
            warn!("Skipping product lookup: credentials not configured");
            return Ok(None);
        };

        let (products, _): (Vec<Product>, _) =
            self.send(request.query(&[("slug", slug)])).await?;

        let Some(product) = products.into_iter().next() else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` without credentials, or an error if the API
    /// request fails.
    #[instrument(skip(self, order), fields(line_items = order.line_items.len()))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, CommerceError> {
        let request = self
            .request(Method::POST, "/orders")
            .ok_or(CommerceError::NotConfigured)?;

        let (created, _): (OrderResponse, _) = self.send(request.json(order)).await?;
        tracing::info!(order_id = %created.id, status = ?created.status, "Order created");
        Ok(created)
    }
}

/// Parse a numeric response header.
fn header_number<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<T>().ok())
}

/// Truncate a response body for logging.
fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
