//! Cart store.
//!
//! A product ID maps to at most one entry; quantities are always at least 1.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearth_core::ProductId;

use crate::store::storage::{self, Storage};
use crate::store::{CART_STORAGE_KEY, ProductSnapshot};

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Result of [`CartStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was created.
    Inserted,
    /// The quantity was added to an existing entry.
    Merged { quantity: u32 },
    /// The product is out of stock; nothing changed.
    OutOfStock,
    /// A zero quantity was requested; nothing changed.
    Ignored,
}

/// Cart state container.
pub struct CartStore {
    items: Vec<CartItem>,
    index: HashMap<ProductId, usize>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart persisted in `storage`, or start empty.
    ///
    /// Persisted data is normalized: duplicate entries are merged and entries
    /// with a zero quantity are dropped.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let persisted: Vec<CartItem> =
            storage::restore(storage.as_ref(), CART_STORAGE_KEY).unwrap_or_default();

        let mut store = Self {
            items: Vec::with_capacity(persisted.len()),
            index: HashMap::with_capacity(persisted.len()),
            storage,
        };

        for item in persisted {
            if item.quantity == 0 {
                continue;
            }
            match store.index.get(&item.product.id) {
                Some(&pos) => {
                    if let Some(existing) = store.items.get_mut(pos) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                }
                None => {
                    store.index.insert(item.product.id, store.items.len());
                    store.items.push(item);
                }
            }
        }

        store
    }

    /// Add `quantity` of `product`, merging with an existing entry.
    ///
    /// Out-of-stock products are rejected with a warning.
    pub fn add(&mut self, product: &ProductSnapshot, quantity: u32) -> AddOutcome {
        if !product.is_purchasable() {
            tracing::warn!(product_id = %product.id, "Refusing to add out-of-stock product to cart");
            return AddOutcome::OutOfStock;
        }
        if quantity == 0 {
            return AddOutcome::Ignored;
        }

        let outcome = if let Some(item) = self.entry_mut(product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
            AddOutcome::Merged {
                quantity: item.quantity,
            }
        } else {
            self.index.insert(product.id, self.items.len());
            self.items.push(CartItem {
                product: product.clone(),
                quantity,
                added_at: Utc::now(),
            });
            AddOutcome::Inserted
        };

        self.persist();
        outcome
    }

    /// Remove the entry for `product_id`. Returns whether one existed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let Some(pos) = self.index.remove(&product_id) else {
            return false;
        };

        self.items.remove(pos);
        self.reindex();
        self.persist();
        true
    }

    /// Set the quantity of an existing entry; `quantity <= 0` removes it.
    ///
    /// Returns whether an entry was changed or removed.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let Some(item) = self.entry_mut(product_id) else {
            return false;
        };

        item.quantity = quantity;
        self.persist();
        true
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
        self.persist();
    }

    /// Sum of unit price times quantity over all entries.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Whether the cart has an entry for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.index.contains_key(&product_id)
    }

    /// Entry for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.index.get(&product_id).and_then(|&pos| self.items.get(pos))
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        let pos = *self.index.get(&product_id)?;
        self.items.get_mut(pos)
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.product.id, pos))
            .collect();
    }

    fn persist(&self) {
        storage::persist(self.storage.as_ref(), CART_STORAGE_KEY, &self.items);
    }
}
