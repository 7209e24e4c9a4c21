//! Shopper extractor.
//!
//! Identifies the shopper behind a session and stages their persisted state.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::checkout::{CHECKOUT_STORAGE_KEY, Checkout};
use crate::error::AppError;
use crate::store::{
    self, CART_STORAGE_KEY, CartStore, SessionStorage, Storage, WISHLIST_STORAGE_KEY,
    WishlistStore,
};

/// Session key for the shopper's stable ID.
pub const SHOPPER_ID_KEY: &str = "shopper_id";

/// Keys staged from the session on every request.
const STAGED_KEYS: [&str; 3] = [CART_STORAGE_KEY, WISHLIST_STORAGE_KEY, CHECKOUT_STORAGE_KEY];

/// The shopper making the request.
///
/// Stores built from it write to a staged copy of the session; call
/// [`Shopper::finish`] before responding to write changes back.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(shopper: Shopper) -> Result<Json<CartView>> {
///     let mut cart = shopper.cart();
///     cart.clear();
///     shopper.finish().await;
///     Ok(Json(CartView::from(&cart)))
/// }
/// ```
pub struct Shopper {
    id: Uuid,
    session: Session,
    storage: Arc<SessionStorage>,
}

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        let id = match session.get::<Uuid>(SHOPPER_ID_KEY).await {
            Ok(Some(id)) => id,
            result => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Failed to read shopper id; assigning a new one");
                }
                let id = Uuid::new_v4();
                if let Err(e) = session.insert(SHOPPER_ID_KEY, id).await {
                    tracing::warn!(error = %e, "Failed to store shopper id");
                }
                id
            }
        };

        let storage = Arc::new(SessionStorage::load(&session, &STAGED_KEYS).await);

        Ok(Self {
            id,
            session,
            storage,
        })
    }
}

impl Shopper {
    /// Stable per-session shopper ID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The shopper's cart.
    #[must_use]
    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage())
    }

    /// The shopper's wishlist.
    #[must_use]
    pub fn wishlist(&self) -> WishlistStore {
        WishlistStore::load(self.storage())
    }

    /// The shopper's checkout, or a fresh one.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        store::storage::restore(self.storage.as_ref(), CHECKOUT_STORAGE_KEY).unwrap_or_default()
    }

    pub fn save_checkout(&self, checkout: &Checkout) {
        store::storage::persist(self.storage.as_ref(), CHECKOUT_STORAGE_KEY, checkout);
    }

    /// Write staged changes back to the session and save it to the store.
    ///
    /// The session layer never saves on 5xx responses and runs only after
    /// the handler's in-flight guards are dropped, so the save happens here.
    pub async fn finish(&self) {
        self.storage.flush(&self.session).await;
        if !self.session.is_modified() {
            return;
        }
        if let Err(e) = self.session.save().await {
            tracing::warn!(shopper_id = %self.id, error = %e, "Failed to save session");
        }
    }

    fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }
}
