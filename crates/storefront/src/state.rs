//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use hearth_core::ProductId;

use crate::checkout::{Backend, InMemoryBackend};
use crate::config::{OrderBackendKind, StorefrontConfig};
use crate::store::InFlight;
use crate::woocommerce::{CommerceError, WooCommerceClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the WooCommerce client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: WooCommerceClient,
    orders: Backend,
    wishlist_toggles: InFlight<(Uuid, ProductId)>,
    submissions: InFlight<Uuid>,
}

impl AppState {
    /// Create a new application state, choosing the order backend from
    /// `config.order_backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if the WooCommerce HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, CommerceError> {
        let catalog = WooCommerceClient::new(&config.woocommerce)?;
        let orders = match config.order_backend {
            OrderBackendKind::WooCommerce => Backend::WooCommerce(catalog.clone()),
            OrderBackendKind::Simulated { delay } => {
                tracing::warn!(?delay, "Using simulated order backend; orders are not placed");
                Backend::Simulated(Arc::new(InMemoryBackend::new().with_delay(delay)))
            }
        };

        Ok(Self::with_backend(config, pool, catalog, orders))
    }

    /// Create application state with an explicit catalog client and order backend.
    #[must_use]
    pub fn with_backend(
        config: StorefrontConfig,
        pool: PgPool,
        catalog: WooCommerceClient,
        orders: Backend,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                orders,
                wishlist_toggles: InFlight::new(),
                submissions: InFlight::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the WooCommerce catalog client.
    #[must_use]
    pub fn catalog(&self) -> &WooCommerceClient {
        &self.inner.catalog
    }

    /// Get a reference to the order backend.
    #[must_use]
    pub fn orders(&self) -> &Backend {
        &self.inner.orders
    }

    /// Wishlist toggles in progress, keyed by shopper and product.
    #[must_use]
    pub fn wishlist_toggles(&self) -> &InFlight<(Uuid, ProductId)> {
        &self.inner.wishlist_toggles
    }

    /// Checkout submissions in progress, keyed by shopper.
    #[must_use]
    pub fn submissions(&self) -> &InFlight<Uuid> {
        &self.inner.submissions
    }
}
