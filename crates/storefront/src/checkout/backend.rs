//! Order backend port.
//!
//! [`WooCommerceClient`] places real orders; [`InMemoryBackend`] stands in for
//! it in tests and in `ORDER_BACKEND=simulated` deployments.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rust_decimal::Decimal;

use hearth_core::{OrderId, OrderStatus};

use crate::woocommerce::{CommerceError, OrderRequest, OrderResponse, WooCommerceClient};

/// Something that can create orders.
pub trait OrderBackend: Send + Sync {
    /// Place `order`.
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderResponse, CommerceError>> + Send;
}

impl OrderBackend for WooCommerceClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, CommerceError> {
        Self::create_order(self, order).await
    }
}

/// In-process order backend with configurable latency and failure.
#[derive(Debug)]
pub struct InMemoryBackend {
    delay: Duration,
    fail_with: Option<u16>,
    calls: AtomicUsize,
    next_id: AtomicU64,
    orders: Mutex<Vec<OrderRequest>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_with: None,
            calls: AtomicUsize::new(0),
            next_id: AtomicU64::new(1000),
            orders: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryBackend {
    /// A backend that accepts every order immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reject every order with upstream status `status`.
    #[must_use]
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_with = Some(status);
        self
    }

    /// Number of `create_order` calls so far, including failed ones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OrderBackend for InMemoryBackend {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, CommerceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(status) = self.fail_with {
            return Err(CommerceError::Status {
                status,
                body: "simulated failure".to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.clone());

        Ok(OrderResponse {
            id: OrderId::new(id),
            order_key: format!("wc_order_{}", uuid::Uuid::new_v4().simple()),
            status: OrderStatus::Pending,
            total: Decimal::ZERO,
            currency: String::new(),
            payment_url: None,
        })
    }
}

/// The backend selected at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    WooCommerce(WooCommerceClient),
    Simulated(Arc<InMemoryBackend>),
}

impl OrderBackend for Backend {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderResponse, CommerceError> {
        match self {
            Self::WooCommerce(client) => OrderBackend::create_order(client, order).await,
            Self::Simulated(backend) => backend.create_order(order).await,
        }
    }
}
