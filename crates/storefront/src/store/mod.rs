//! Shopper state containers: cart and wishlist.
//!
//! Stores are plain values constructed per request from an injected
//! [`Storage`]. Every mutation re-serializes the full entry list and writes it
//! back; a failed write is logged and the in-memory state stays authoritative.
//!
//! ```text
//! session ──load──▶ SessionStorage ──▶ CartStore / WishlistStore
//!    ▲                   │ (staged writes)
//!    └──────flush────────┘
//! ```

pub mod cart;
pub mod inflight;
pub mod product;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use cart::{AddOutcome, CartItem, CartStore};
pub use inflight::{InFlight, InFlightGuard};
pub use product::ProductSnapshot;
pub use session::SessionStorage;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use wishlist::{ToggleOutcome, WishlistItem, WishlistStore};

/// Storage key for the serialized cart entry list.
pub const CART_STORAGE_KEY: &str = "cart";

/// Storage key for the serialized wishlist entry list.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist";
