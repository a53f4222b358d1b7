//! # SQLite Cart Store
//!
//! [`CartStore`] on top of [`CartRepository`].
//!
//! The cart engine calls its store synchronously; every call here blocks on
//! the async repository through a Tokio runtime handle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (sync)                                                            │
//! │     │  store.update_cart(&snapshot)                                     │
//! │     ▼                                                                   │
//! │  SqliteCartStore ── handle.block_on(..) ──► CartRepository (async)      │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │                                          SqlitePool (runtime workers)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Handle::block_on` panics when called from inside an async context, so
//! the store must be driven from a plain thread (the CLI main thread, a
//! `spawn_blocking` task, a sync test).

use cart_core::{CartSnapshot, CartStore, ItemRecord, OwnerContext, PersistedCart};
use tokio::runtime::Handle;

use crate::error::{DbError, DbResult};
use crate::repository::cart::CartRepository;

/// SQLite-backed [`CartStore`].
#[derive(Debug, Clone)]
pub struct SqliteCartStore {
    carts: CartRepository,
    handle: Handle,
}

impl SqliteCartStore {
    pub fn new(carts: CartRepository, handle: Handle) -> Self {
        SqliteCartStore { carts, handle }
    }

    pub fn repository(&self) -> &CartRepository {
        &self.carts
    }
}

impl CartStore for SqliteCartStore {
    type Error = DbError;

    fn load_cart(&mut self, owner: &OwnerContext) -> DbResult<Option<CartSnapshot>> {
        self.handle.block_on(self.carts.get_by_owner(owner))
    }

    fn store_new_cart(
        &mut self,
        owner: &OwnerContext,
        snapshot: &CartSnapshot,
    ) -> DbResult<PersistedCart> {
        self.handle.block_on(self.carts.insert_cart(owner, snapshot))
    }

    fn update_cart(&mut self, snapshot: &CartSnapshot) -> DbResult<()> {
        let cart_id = snapshot
            .id
            .as_deref()
            .ok_or_else(|| DbError::invalid_data("cart id", "snapshot has no id"))?;

        self.handle
            .block_on(self.carts.update_totals(cart_id, &snapshot.totals))
    }

    fn add_cart_item(&mut self, cart_id: &str, item: &ItemRecord) -> DbResult<String> {
        self.handle.block_on(self.carts.insert_item(cart_id, item))
    }

    fn set_item_quantity(&mut self, item_id: &str, quantity: u32) -> DbResult<()> {
        self.handle
            .block_on(self.carts.set_item_quantity(item_id, quantity))
    }

    fn remove_item(&mut self, item_id: &str) -> DbResult<()> {
        self.handle.block_on(self.carts.delete_item(item_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
