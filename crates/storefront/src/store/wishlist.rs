//! Wishlist store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hearth_core::ProductId;

use crate::store::storage::{self, Storage};
use crate::store::{ProductSnapshot, WISHLIST_STORAGE_KEY};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product: ProductSnapshot,
    pub added_at: DateTime<Utc>,
}

/// Result of [`WishlistStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Set of saved products, kept in the order they were added.
pub struct WishlistStore {
    items: Vec<WishlistItem>,
    members: HashSet<ProductId>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    /// Load the wishlist persisted in `storage`, or start empty.
    ///
    /// Duplicate persisted entries keep their first occurrence.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let persisted: Vec<WishlistItem> =
            storage::restore(storage.as_ref(), WISHLIST_STORAGE_KEY).unwrap_or_default();

        let mut members = HashSet::with_capacity(persisted.len());
        let items = persisted
            .into_iter()
            .filter(|item| members.insert(item.product.id))
            .collect();

        Self {
            items,
            members,
            storage,
        }
    }

    /// Add `product` if absent, remove it if present.
    pub fn toggle(&mut self, product: &ProductSnapshot) -> ToggleOutcome {
        if self.remove(product.id) {
            ToggleOutcome::Removed
        } else {
            self.insert(product);
            ToggleOutcome::Added
        }
    }

    /// Add `product`. Returns `false` if it was already saved.
    pub fn add(&mut self, product: &ProductSnapshot) -> bool {
        if self.members.contains(&product.id) {
            return false;
        }
        self.insert(product);
        true
    }

    /// Remove `product_id`. Returns whether it was saved.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        if !self.members.remove(&product_id) {
            return false;
        }
        self.items.retain(|item| item.product.id != product_id);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
        self.persist();
    }

    #[must_use]
    pub fn is_member(&self, product_id: ProductId) -> bool {
        self.members.contains(&product_id)
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, product: &ProductSnapshot) {
        self.members.insert(product.id);
        self.items.push(WishlistItem {
            product: product.clone(),
            added_at: Utc::now(),
        });
        self.persist();
    }

    fn persist(&self) {
        storage::persist(self.storage.as_ref(), WISHLIST_STORAGE_KEY, &self.items);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use hearth_core::StockStatus;
    use rust_decimal::Decimal;

    fn product(id: u64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            price: Decimal::new(1500, 2),
            regular_price: None,
            on_sale: false,
            image: None,
            stock_status: StockStatus::OutOfStock,
        }
    }

    fn empty_wishlist() -> (Arc<MemoryStorage>, WishlistStore) {
        let storage = Arc::new(MemoryStorage::new());
        let wishlist = WishlistStore::load(storage.clone());
        (storage, wishlist)
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let (_, mut wishlist) = empty_wishlist();
        let p = product(7);

        assert_eq!(wishlist.toggle(&p), ToggleOutcome::Added);
        assert!(wishlist.is_member(p.id));
        assert_eq!(wishlist.toggle(&p), ToggleOutcome::Removed);
        assert!(!wishlist.is_member(p.id));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_out_of_stock_products_can_be_saved() {
        let (_, mut wishlist) = empty_wishlist();
        assert!(wishlist.add(&product(1)));
        assert!(wishlist.is_member(ProductId::new(1)));
    }

    #[test]
    fn test_add_existing_is_noop() {
        let (_, mut wishlist) = empty_wishlist();
        let p = product(1);
        assert!(wishlist.add(&p));
        let added_at = wishlist.get(p.id).unwrap().added_at;

        assert!(!wishlist.add(&p));
        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist.get(p.id).unwrap().added_at, added_at);
    }

    #[test]
    fn test_remove_and_clear() {
        let (storage, mut wishlist) = empty_wishlist();
        wishlist.add(&product(1));
        wishlist.add(&product(2));

        assert!(wishlist.remove(ProductId::new(1)));
        assert!(!wishlist.remove(ProductId::new(1)));
        assert_eq!(wishlist.items()[0].product.id, ProductId::new(2));

        wishlist.clear();
        assert!(wishlist.is_empty());
        assert_eq!(storage.get(WISHLIST_STORAGE_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_preserves_order_and_dedups() {
        let (storage, mut wishlist) = empty_wishlist();
        wishlist.add(&product(3));
        wishlist.add(&product(1));

        let reloaded = WishlistStore::load(storage.clone());
        let ids: Vec<u64> = reloaded.items().iter().map(|i| i.product.id.as_u64()).collect();
        assert_eq!(ids, vec![3, 1]);

        let mut doubled = reloaded.items().to_vec();
        doubled.push(doubled[0].clone());
        storage
            .write(WISHLIST_STORAGE_KEY, serde_json::to_string(&doubled).unwrap())
            .unwrap();
        assert_eq!(WishlistStore::load(storage).len(), 2);
    }
}
