//! # In-Memory Store
//!
//! A complete [`CartStore`] kept in process memory.
//!
//! Besides serving embedded use, it journals every call it receives and can
//! be told to fail the next call of a given kind. Cart tests lean on both.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use super::{CartStore, OwnerContext, PersistedCart};
use crate::cart::CartSnapshot;
use crate::item::ItemRecord;
use crate::totals::CartTotals;

/// The kind of a store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    LoadCart,
    StoreNewCart,
    UpdateCart,
    AddCartItem,
    SetItemQuantity,
    RemoveItem,
}

/// One journaled store call, with the arguments that matter for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    LoadCart { owner: String },
    StoreNewCart { owner: String, items: usize },
    UpdateCart { cart_id: Option<String> },
    AddCartItem { cart_id: String, source_id: String },
    SetItemQuantity { item_id: String, quantity: u32 },
    RemoveItem { item_id: String },
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::LoadCart { .. } => StoreOp::LoadCart,
            StoreCall::StoreNewCart { .. } => StoreOp::StoreNewCart,
            StoreCall::UpdateCart { .. } => StoreOp::UpdateCart,
            StoreCall::AddCartItem { .. } => StoreOp::AddCartItem,
            StoreCall::SetItemQuantity { .. } => StoreOp::SetItemQuantity,
            StoreCall::RemoveItem { .. } => StoreOp::RemoveItem,
        }
    }
}

/// Errors raised by [`MemoryCartStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("Cart not found: {0}")]
    UnknownCart(String),

    #[error("Cart item not found: {0}")]
    UnknownItem(String),

    #[error("Cart snapshot has no id")]
    MissingCartId,

    #[error("Store unavailable during {op:?}")]
    Unavailable { op: StoreOp },
}

#[derive(Debug, Clone)]
struct StoredCart {
    totals: CartTotals,
    items: Vec<ItemRecord>,
}

/// In-memory [`CartStore`].
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    carts: HashMap<String, StoredCart>,
    owners: HashMap<OwnerContext, String>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreOp>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, oldest first (failed calls included).
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Makes the next call of kind `op` fail with
    /// [`MemoryStoreError::Unavailable`] without touching stored state.
    pub fn fail_next(&mut self, op: StoreOp) {
        self.fail_next = Some(op);
    }

    /// Reads the owner's stored cart without journaling the call.
    pub fn peek(&self, owner: &OwnerContext) -> Option<CartSnapshot> {
        self.owners
            .get(owner)
            .and_then(|cart_id| self.carts.get(cart_id).map(|cart| (cart_id, cart)))
            .map(|(cart_id, cart)| CartSnapshot {
                id: Some(cart_id.clone()),
                totals: cart.totals.clone(),
                items: Some(cart.items.clone()),
            })
    }

    /// Number of stored carts.
    pub fn cart_count(&self) -> usize {
        self.carts.len()
    }

    fn record(&mut self, call: StoreCall) -> Result<(), MemoryStoreError> {
        let op = call.op();
        self.calls.push(call);

        if self.fail_next == Some(op) {
            self.fail_next = None;
            return Err(MemoryStoreError::Unavailable { op });
        }

        Ok(())
    }

    fn find_item_mut(&mut self, item_id: &str) -> Option<(&mut StoredCart, usize)> {
        self.carts.values_mut().find_map(|cart| {
            let position = cart
                .items
                .iter()
                .position(|item| item.id.as_deref() == Some(item_id))?;
            Some((cart, position))
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl CartStore for MemoryCartStore {
    type Error = MemoryStoreError;

    fn load_cart(&mut self, owner: &OwnerContext) -> Result<Option<CartSnapshot>, Self::Error> {
        self.record(StoreCall::LoadCart {
            owner: owner.to_string(),
        })?;

        Ok(self.peek(owner))
    }

    fn store_new_cart(
        &mut self,
        owner: &OwnerContext,
        snapshot: &CartSnapshot,
    ) -> Result<PersistedCart, Self::Error> {
        let records = snapshot.items.clone().unwrap_or_default();
        self.record(StoreCall::StoreNewCart {
            owner: owner.to_string(),
            items: records.len(),
        })?;

        let cart_id = new_id();
        let items: Vec<ItemRecord> = records
            .into_iter()
            .map(|record| ItemRecord {
                id: Some(new_id()),
                ..record
            })
            .collect();
        let item_ids = items.iter().filter_map(|item| item.id.clone()).collect();

        // A fresh cart replaces whatever the owner had before.
        if let Some(previous) = self.owners.insert(owner.clone(), cart_id.clone()) {
            self.carts.remove(&previous);
        }
        self.carts.insert(
            cart_id.clone(),
            StoredCart {
                totals: snapshot.totals.clone(),
                items,
            },
        );

        Ok(PersistedCart { cart_id, item_ids })
    }

    fn update_cart(&mut self, snapshot: &CartSnapshot) -> Result<(), Self::Error> {
        self.record(StoreCall::UpdateCart {
            cart_id: snapshot.id.clone(),
        })?;

        let cart_id = snapshot.id.as_deref().ok_or(MemoryStoreError::MissingCartId)?;
        let cart = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| MemoryStoreError::UnknownCart(cart_id.to_string()))?;

        cart.totals = snapshot.totals.clone();
        Ok(())
    }

    fn add_cart_item(&mut self, cart_id: &str, item: &ItemRecord) -> Result<String, Self::Error> {
        self.record(StoreCall::AddCartItem {
            cart_id: cart_id.to_string(),
            source_id: item.source_id.clone(),
        })?;

        let cart = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| MemoryStoreError::UnknownCart(cart_id.to_string()))?;

        let item_id = new_id();
        cart.items.push(ItemRecord {
            id: Some(item_id.clone()),
            ..item.clone()
        });

        Ok(item_id)
    }

    fn set_item_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), Self::Error> {
        self.record(StoreCall::SetItemQuantity {
            item_id: item_id.to_string(),
            quantity,
        })?;

        let (cart, position) = self
            .find_item_mut(item_id)
            .ok_or_else(|| MemoryStoreError::UnknownItem(item_id.to_string()))?;

        if let Some(item) = cart.items.get_mut(position) {
            item.quantity = quantity;
        }
        Ok(())
    }

    fn remove_item(&mut self, item_id: &str) -> Result<(), Self::Error> {
        self.record(StoreCall::RemoveItem {
            item_id: item_id.to_string(),
        })?;

        let (cart, position) = self
            .find_item_mut(item_id)
            .ok_or_else(|| MemoryStoreError::UnknownItem(item_id.to_string()))?;

        cart.items.remove(position);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
