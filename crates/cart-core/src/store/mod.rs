//! # Storage Contract
//!
//! The narrow interface through which a [`crate::cart::Cart`] persists
//! itself.
//!
//! ## Call Patterns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart::load            ──► load_cart(owner)                            │
//! │                                                                         │
//! │  first mutation        ──► store_new_cart(owner, snapshot + items)     │
//! │  (cart has no id)          → PersistedCart { cart_id, item_ids }       │
//! │                                                                         │
//! │  later mutations       ──► set_item_quantity / remove_item (item)      │
//! │  (cart has an id)      ──► update_cart(snapshot without items)         │
//! │                        ──► add_cart_item(cart_id, record) → item id    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementations
//! - [`memory::MemoryCartStore`] - in-process, with a call journal
//! - `cart_db::SqliteCartStore` - SQLite via sqlx

use std::error::Error as StdError;
use std::fmt;

use crate::cart::CartSnapshot;
use crate::item::ItemRecord;

pub mod memory;

pub use memory::{MemoryCartStore, MemoryStoreError, StoreCall, StoreOp};

/// Identifies whose cart is being worked on (session, user, ...).
///
/// Opaque to the cart; stores use it as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerContext(String);

impl OwnerContext {
    pub fn new(key: impl Into<String>) -> Self {
        OwnerContext(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerContext {
    fn from(key: &str) -> Self {
        OwnerContext::new(key)
    }
}

impl From<String> for OwnerContext {
    fn from(key: String) -> Self {
        OwnerContext(key)
    }
}

impl fmt::Display for OwnerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers assigned when a cart is stored for the first time.
///
/// `item_ids` follows the order of the stored items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCart {
    pub cart_id: String,
    pub item_ids: Vec<String>,
}

/// Durable home of a cart and its items.
///
/// Errors are opaque to the cart: they are boxed into
/// [`crate::CartError::Storage`] and returned as-is.
pub trait CartStore {
    type Error: StdError + Send + Sync + 'static;

    /// Loads the owner's cart. The snapshot carries the cart id and the items
    /// in display order.
    fn load_cart(&mut self, owner: &OwnerContext) -> Result<Option<CartSnapshot>, Self::Error>;

    /// Stores a cart seen for the first time, together with its items.
    fn store_new_cart(
        &mut self,
        owner: &OwnerContext,
        snapshot: &CartSnapshot,
    ) -> Result<PersistedCart, Self::Error>;

    /// Overwrites the totals of an already stored cart. `snapshot.id` names
    /// the cart; items are not included.
    fn update_cart(&mut self, snapshot: &CartSnapshot) -> Result<(), Self::Error>;

    /// Appends an item to a stored cart and returns the new item id.
    fn add_cart_item(&mut self, cart_id: &str, item: &ItemRecord) -> Result<String, Self::Error>;

    fn set_item_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), Self::Error>;

    fn remove_item(&mut self, item_id: &str) -> Result<(), Self::Error>;
}
