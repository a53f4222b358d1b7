//! # Cart
//!
//! The authoritative in-memory cart: items, derived totals, and the
//! storage calls that keep the durable copy in step.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item / remove_at / increment_quantity_at / decrement_quantity_at  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate      index in range, entity has name + price, limits      │
//! │  2. mutate        items (merge by source type + id, append, remove)    │
//! │  3. recalculate   totals::calculate(.., DiscountPolicy::Reset, ..)     │
//! │  4. persist       item call (quantity / remove), then cart call        │
//! │                   (store_new_cart | update_cart [+ add_cart_item])     │
//! │  5. return        CartSnapshot with items                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures leave the cart untouched. A storage failure surfaces
//! as [`CartError::Storage`]; the cart value is stale afterwards and should
//! be dropped and reloaded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CartConfig;
use crate::error::{CartError, CartResult, ValidationError};
use crate::item::{ItemRecord, LineItem, PricedEntity};
use crate::money::{Money, Percentage};
use crate::store::{CartStore, OwnerContext};
use crate::totals::{self, CartTotals, DiscountPolicy};
use crate::validation::{validate_cart_size, validate_non_negative};

/// Basis points in one hundred percent.
const MAX_DISCOUNT_BPS: u32 = 10_000;

// =============================================================================
// Snapshot
// =============================================================================

/// Serialized cart: the derived totals, the id once persisted, and the items
/// when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub totals: CartTotals,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemRecord>>,
}

// =============================================================================
// Discount
// =============================================================================

/// A discount handed to [`Cart::apply_discount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// Percentage of the subtotal.
    Percentage(Percentage),
    /// Fixed amount, capped at the subtotal.
    Amount(Money),
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart bound to one owner and one storage collaborator.
#[derive(Debug)]
pub struct Cart<S: CartStore> {
    store: S,
    owner: OwnerContext,
    config: CartConfig,
    id: Option<String>,
    items: Vec<LineItem>,
    totals: CartTotals,
}

impl<S: CartStore> Cart<S> {
    /// Loads the owner's cart from `store`, or starts an empty one.
    ///
    /// A loaded cart keeps its persisted totals as-is; nothing is
    /// recalculated until the first mutation.
    pub fn load(
        mut store: S,
        owner: impl Into<OwnerContext>,
        config: CartConfig,
    ) -> CartResult<Self> {
        let owner = owner.into();
        let stored = store.load_cart(&owner).map_err(CartError::storage)?;

        let (id, items, totals) = match stored {
            Some(snapshot) => (
                snapshot.id,
                snapshot
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(LineItem::from_record)
                    .collect(),
                snapshot.totals,
            ),
            None => (None, Vec::new(), CartTotals::default()),
        };

        debug!(owner = %owner, cart_id = ?id, items = items.len(), "Cart loaded");

        Ok(Cart {
            store,
            owner,
            config,
            id,
            items,
            totals,
        })
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds one unit of `entity`.
    ///
    /// An item with the same source type and id gets its quantity bumped;
    /// otherwise a new item is appended. Any applied discount is dropped.
    ///
    /// ## Errors
    /// - [`CartError::MissingName`] / [`CartError::MissingPrice`]
    /// - [`CartError::Validation`] for a price, quantity or item count over
    ///   its limit; the cart is left untouched
    pub fn add_item<E>(&mut self, entity: &E) -> CartResult<CartSnapshot>
    where
        E: PricedEntity + ?Sized,
    {
        debug!(
            source_type = %entity.source_type(),
            source_id = %entity.source_id(),
            "add_item"
        );

        match self.items.iter().position(|item| item.represents(entity)) {
            Some(index) => {
                self.item_mut(index)?.increment()?;
                self.update_totals(DiscountPolicy::Reset);
                self.sync_quantity(index)?;
                self.persist(false)?;
            }
            None => {
                let item = LineItem::from_entity(entity)?;
                validate_cart_size(self.items.len())?;
                self.items.push(item);
                self.update_totals(DiscountPolicy::Reset);
                self.persist(true)?;
            }
        }

        Ok(self.snapshot(true))
    }

    /// Removes the item at `index`; later items move up by one.
    pub fn remove_at(&mut self, index: usize) -> CartResult<CartSnapshot> {
        self.check_index(index)?;
        debug!(index, "remove_at");

        let removed = self.items.remove(index);
        self.update_totals(DiscountPolicy::Reset);

        if let Some(item_id) = removed.id() {
            self.store.remove_item(item_id).map_err(CartError::storage)?;
        }
        self.persist(false)?;

        Ok(self.snapshot(true))
    }

    /// Adds one to the quantity of the item at `index`.
    pub fn increment_quantity_at(&mut self, index: usize) -> CartResult<CartSnapshot> {
        let item = self.item_mut(index)?;
        item.increment()?;
        debug!(index, quantity = item.quantity(), "increment_quantity_at");

        self.update_totals(DiscountPolicy::Reset);
        self.sync_quantity(index)?;
        self.persist(false)?;

        Ok(self.snapshot(true))
    }

    /// Takes one off the quantity of the item at `index`. An item at
    /// quantity 1 is removed instead.
    pub fn decrement_quantity_at(&mut self, index: usize) -> CartResult<CartSnapshot> {
        let item = self.item_mut(index)?;
        if item.quantity() == 1 {
            return self.remove_at(index);
        }

        item.decrement();
        debug!(index, quantity = item.quantity(), "decrement_quantity_at");

        self.update_totals(DiscountPolicy::Reset);
        self.sync_quantity(index)?;
        self.persist(false)?;

        Ok(self.snapshot(true))
    }

    /// Applies a discount and recalculates while keeping it.
    ///
    /// The discount lasts until the next content change, which resets it.
    /// Whether a coupon may be used is decided before calling this.
    ///
    /// ## Errors
    /// - [`ValidationError::OutOfRange`] for a percentage above 100%
    /// - [`ValidationError::Negative`] for a negative amount
    pub fn apply_discount(
        &mut self,
        discount: Discount,
        coupon_id: Option<String>,
    ) -> CartResult<CartSnapshot> {
        let subtotal: Money = self.items.iter().map(LineItem::line_total).sum();

        let (amount, percentage) = match discount {
            Discount::Percentage(pct) => {
                if pct.bps() > MAX_DISCOUNT_BPS {
                    return Err(ValidationError::OutOfRange {
                        field: "discount_percentage".to_string(),
                        min: 0,
                        max: 100,
                    }
                    .into());
                }
                (subtotal.percent_of(pct), pct)
            }
            Discount::Amount(amount) => {
                let amount = validate_non_negative("discount", amount)?;
                (amount.min(subtotal), Percentage::zero())
            }
        };

        debug!(
            discount = %amount,
            percentage = %percentage,
            coupon_id = ?coupon_id,
            "apply_discount"
        );

        self.totals.discount = amount;
        self.totals.discount_percentage = percentage;
        self.totals.coupon_id = coupon_id;
        self.update_totals(DiscountPolicy::Retain);
        self.persist(false)?;

        Ok(self.snapshot(true))
    }

    /// Removes every item.
    ///
    /// A cart that was never stored has nothing to write back.
    pub fn clear(&mut self) -> CartResult<CartSnapshot> {
        debug!(items = self.items.len(), "clear");

        let removed = std::mem::take(&mut self.items);
        self.update_totals(DiscountPolicy::Reset);

        for item_id in removed.iter().filter_map(LineItem::id) {
            self.store.remove_item(item_id).map_err(CartError::storage)?;
        }
        if self.id.is_some() {
            self.persist(false)?;
        }

        Ok(self.snapshot(true))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Serializes the cart; `with_items` adds the item records.
    pub fn snapshot(&self, with_items: bool) -> CartSnapshot {
        CartSnapshot {
            id: self.id.clone(),
            totals: self.totals.clone(),
            items: with_items.then(|| self.items.iter().map(LineItem::to_record).collect()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn owner(&self) -> &OwnerContext {
        &self.owner
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Gives the storage collaborator back, dropping the cart.
    pub fn into_store(self) -> S {
        self.store
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn check_index(&self, index: usize) -> CartResult<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(CartError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    fn item_mut(&mut self, index: usize) -> CartResult<&mut LineItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })
    }

    fn update_totals(&mut self, policy: DiscountPolicy) {
        self.totals = totals::calculate(&self.items, &self.totals, policy, &self.config);

        debug!(
            subtotal = %self.totals.subtotal,
            discount = %self.totals.discount,
            total = %self.totals.total,
            payable = %self.totals.payable,
            "Totals recalculated"
        );
    }

    /// Pushes the quantity of the item at `index` to storage, if it has an id.
    fn sync_quantity(&mut self, index: usize) -> CartResult<()> {
        if let Some(item) = self.items.get(index) {
            if let Some(item_id) = item.id() {
                self.store
                    .set_item_quantity(item_id, item.quantity())
                    .map_err(CartError::storage)?;
            }
        }
        Ok(())
    }

    /// Writes the cart: a new snapshot the first time, then totals updates
    /// plus the appended item when `new_item` is set.
    fn persist(&mut self, new_item: bool) -> CartResult<()> {
        match self.id.clone() {
            Some(cart_id) => {
                let snapshot = self.snapshot(false);
                self.store.update_cart(&snapshot).map_err(CartError::storage)?;

                if new_item {
                    if let Some(item) = self.items.last_mut() {
                        let item_id = self
                            .store
                            .add_cart_item(&cart_id, &item.to_record())
                            .map_err(CartError::storage)?;
                        item.assign_id(item_id);
                    }
                }
            }
            None => {
                let snapshot = self.snapshot(true);
                let persisted = self
                    .store
                    .store_new_cart(&self.owner, &snapshot)
                    .map_err(CartError::storage)?;

                debug!(cart_id = %persisted.cart_id, "Cart stored");

                for (item, item_id) in self.items.iter_mut().zip(persisted.item_ids) {
                    item.assign_id(item_id);
                }
                self.id = Some(persisted.cart_id);
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundOffTo;
    use crate::item::EntityAttributes;
    use crate::store::{MemoryCartStore, MemoryStoreError, StoreCall, StoreOp};
    use crate::types::Product;

    const OWNER: &str = "session-42";

    /// Attribute-style entity of another type, to check identity by type.
    struct Bundle {
        id: &'static str,
        name: Option<&'static str>,
        price: Option<Money>,
    }

    impl PricedEntity for Bundle {
        fn source_type(&self) -> &str {
            "bundle"
        }

        fn source_id(&self) -> String {
            self.id.to_string()
        }

        fn attributes(&self) -> EntityAttributes<'_> {
            EntityAttributes {
                name: self.name,
                price: self.price,
            }
        }
    }

    fn ten_percent_tax() -> CartConfig {
        CartConfig::new().tax_percentage(Percentage::from_bps(1000))
    }

    fn empty_cart(config: CartConfig) -> Cart<MemoryCartStore> {
        Cart::load(MemoryCartStore::new(), OWNER, config).unwrap()
    }

    fn reload(cart: Cart<MemoryCartStore>) -> Cart<MemoryCartStore> {
        let config = cart.config().clone();
        Cart::load(cart.into_store(), OWNER, config).unwrap()
    }

    #[test]
    fn test_new_cart_starts_empty() {
        let cart = empty_cart(ten_percent_tax());

        assert!(cart.is_empty());
        assert_eq!(cart.id(), None);
        assert_eq!(cart.totals(), &CartTotals::default());
        assert_eq!(
            cart.store().calls(),
            &[StoreCall::LoadCart {
                owner: OWNER.to_string()
            }]
        );
    }

    #[test]
    fn test_basic_totals_scenario() {
        let mut cart = empty_cart(ten_percent_tax());
        let shirt = Product::new("p-1", "Shirt", 1000);
        let socks = Product::new("p-2", "Socks", 500);

        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();
        let snapshot = cart.add_item(&socks).unwrap();

        assert_eq!(snapshot.totals.subtotal.cents(), 2500);
        assert_eq!(snapshot.totals.net_total.cents(), 2500);
        assert_eq!(snapshot.totals.tax.cents(), 250);
        assert_eq!(snapshot.totals.total.cents(), 2750);
        assert_eq!(snapshot.totals.payable.cents(), 2750);
        assert_eq!(snapshot.totals.round_off.cents(), 0);
        assert_eq!(snapshot.items.map(|items| items.len()), Some(2));
    }

    #[test]
    fn test_adding_same_entity_merges_quantity() {
        let mut cart = empty_cart(CartConfig::default());
        let shirt = Product::new("p-1", "Shirt", 1000);

        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity(), 3);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_identity_uses_type_and_id() {
        let mut cart = empty_cart(CartConfig::default());
        let product = Product::new("7", "Shirt", 1000);
        let bundle = Bundle {
            id: "7",
            name: Some("Starter bundle"),
            price: Some(Money::from_cents(2000)),
        };

        cart.add_item(&product).unwrap();
        cart.add_item(&bundle).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items()[1].source_type(), "bundle");
    }

    #[test]
    fn test_first_add_stores_new_cart_then_updates() {
        let mut cart = empty_cart(CartConfig::default());
        let shirt = Product::new("p-1", "Shirt", 1000);
        let socks = Product::new("p-2", "Socks", 500);

        cart.add_item(&shirt).unwrap();
        let cart_id = cart.id().unwrap().to_string();
        let shirt_id = cart.items()[0].id().unwrap().to_string();

        cart.add_item(&shirt).unwrap();
        cart.add_item(&socks).unwrap();

        let calls = &cart.store().calls()[1..];
        assert_eq!(
            calls,
            &[
                StoreCall::StoreNewCart {
                    owner: OWNER.to_string(),
                    items: 1
                },
                StoreCall::SetItemQuantity {
                    item_id: shirt_id,
                    quantity: 2
                },
                StoreCall::UpdateCart {
                    cart_id: Some(cart_id.clone())
                },
                StoreCall::UpdateCart {
                    cart_id: Some(cart_id.clone())
                },
                StoreCall::AddCartItem {
                    cart_id,
                    source_id: "p-2".to_string()
                },
            ]
        );
        assert!(cart.items().iter().all(|item| item.id().is_some()));
    }

    #[test]
    fn test_state_survives_reload() {
        let config = ten_percent_tax().round_off_to(Some(RoundOffTo::WholeUnit));
        let mut cart = empty_cart(config);
        cart.add_item(&Product::new("p-1", "Shirt", 1234)).unwrap();
        cart.add_item(&Product::new("p-2", "Socks", 99)).unwrap();
        cart.increment_quantity_at(1).unwrap();
        let before = cart.snapshot(true);

        let cart = reload(cart);

        assert_eq!(cart.snapshot(true), before);
    }

    #[test]
    fn test_loading_does_not_recalculate() {
        let mut cart = empty_cart(ten_percent_tax());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();
        let stored_totals = cart.totals().clone();

        // Same stored cart, opened with a different tax rate.
        let store = cart.into_store();
        let cart = Cart::load(store, OWNER, CartConfig::default()).unwrap();

        assert_eq!(cart.totals(), &stored_totals);
        assert_eq!(cart.totals().tax.cents(), 100);
    }

    #[test]
    fn test_missing_name_rejects_without_side_effects() {
        let mut cart = empty_cart(CartConfig::default());
        let nameless = Bundle {
            id: "b-1",
            name: None,
            price: Some(Money::from_cents(100)),
        };

        let err = cart.add_item(&nameless).unwrap_err();

        assert!(matches!(err, CartError::MissingName { .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.store().calls().len(), 1);
    }

    #[test]
    fn test_missing_price_rejects() {
        let mut cart = empty_cart(CartConfig::default());
        let priceless = Bundle {
            id: "b-1",
            name: Some("Mystery"),
            price: None,
        };

        let err = cart.add_item(&priceless).unwrap_err();
        assert!(matches!(err, CartError::MissingPrice { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_index_out_of_range_touches_nothing() {
        let mut cart = empty_cart(CartConfig::default());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();
        cart.store_mut().clear_calls();
        let before = cart.snapshot(true);

        for result in [
            cart.remove_at(1),
            cart.increment_quantity_at(5),
            cart.decrement_quantity_at(1),
        ] {
            assert!(matches!(
                result,
                Err(CartError::IndexOutOfRange { len: 1, .. })
            ));
        }

        assert_eq!(cart.snapshot(true), before);
        assert!(cart.store().calls().is_empty());
    }

    #[test]
    fn test_remove_at_repacks_items() {
        let mut cart = empty_cart(CartConfig::default());
        for (id, price) in [("a", 100), ("b", 200), ("c", 300)] {
            cart.add_item(&Product::new(id, id, price)).unwrap();
        }
        let removed_id = cart.items()[1].id().unwrap().to_string();
        cart.store_mut().clear_calls();

        let snapshot = cart.remove_at(1).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(LineItem::source_id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(snapshot.totals.subtotal.cents(), 400);
        assert_eq!(cart.store().calls()[0], StoreCall::RemoveItem { item_id: removed_id });
        assert_eq!(cart.store().calls()[1].op(), StoreOp::UpdateCart);

        let cart = reload(cart);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_removing_only_item_zeroes_totals() {
        let config = ten_percent_tax()
            .shipping(Money::from_cents(5000), Money::from_cents(499))
            .round_off_to(Some(RoundOffTo::HalfUnit));
        let mut cart = empty_cart(config);
        cart.add_item(&Product::new("p-1", "Shirt", 1999)).unwrap();

        let snapshot = cart.remove_at(0).unwrap();

        assert!(snapshot.totals.subtotal.is_zero());
        assert!(snapshot.totals.shipping_charges.is_zero());
        assert!(snapshot.totals.total.is_zero());
        assert!(snapshot.totals.payable.is_zero());
        assert_eq!(snapshot.items, Some(Vec::new()));
    }

    #[test]
    fn test_increment_quantity_at() {
        let mut cart = empty_cart(ten_percent_tax());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();

        let snapshot = cart.increment_quantity_at(0).unwrap();

        assert_eq!(cart.items()[0].quantity(), 2);
        assert_eq!(snapshot.totals.subtotal.cents(), 2000);
        assert_eq!(snapshot.totals.total.cents(), 2200);

        let cart = reload(cart);
        assert_eq!(cart.items()[0].quantity(), 2);
    }

    #[test]
    fn test_decrement_above_one_keeps_item() {
        let mut cart = empty_cart(CartConfig::default());
        let shirt = Product::new("p-1", "Shirt", 1000);
        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();
        cart.add_item(&shirt).unwrap();

        cart.decrement_quantity_at(0).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity(), 2);
        assert_eq!(cart.totals().subtotal.cents(), 2000);
    }

    #[test]
    fn test_decrement_at_one_removes_item() {
        let mut cart = empty_cart(CartConfig::default());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();
        cart.add_item(&Product::new("p-2", "Socks", 500)).unwrap();
        cart.store_mut().clear_calls();

        cart.decrement_quantity_at(0).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].source_id(), "p-2");
        assert_eq!(cart.store().calls()[0].op(), StoreOp::RemoveItem);
        assert!(cart
            .store()
            .calls()
            .iter()
            .all(|call| call.op() != StoreOp::SetItemQuantity));
    }

    #[test]
    fn test_applied_discount_is_retained_then_reset() {
        let mut cart = empty_cart(ten_percent_tax());
        cart.add_item(&Product::new("p-1", "Shirt", 4000)).unwrap();

        let snapshot = cart
            .apply_discount(
                Discount::Percentage(Percentage::from_bps(2500)),
                Some("SPRING25".to_string()),
            )
            .unwrap();

        assert_eq!(snapshot.totals.discount.cents(), 1000);
        assert_eq!(snapshot.totals.discount_percentage.bps(), 2500);
        assert_eq!(snapshot.totals.coupon_id.as_deref(), Some("SPRING25"));
        assert_eq!(snapshot.totals.net_total.cents(), 3000);
        assert_eq!(snapshot.totals.tax.cents(), 300);

        // Survives a reload untouched.
        let mut cart = reload(cart);
        assert_eq!(cart.totals().discount.cents(), 1000);

        // Any content change drops it.
        let snapshot = cart.increment_quantity_at(0).unwrap();
        assert!(snapshot.totals.discount.is_zero());
        assert!(snapshot.totals.discount_percentage.is_zero());
        assert_eq!(snapshot.totals.coupon_id, None);
        assert_eq!(snapshot.totals.net_total.cents(), 8000);
    }

    #[test]
    fn test_fixed_discount_is_capped_at_subtotal() {
        let mut cart = empty_cart(CartConfig::default());
        cart.add_item(&Product::new("p-1", "Shirt", 1500)).unwrap();

        let snapshot = cart
            .apply_discount(Discount::Amount(Money::from_cents(5000)), None)
            .unwrap();

        assert_eq!(snapshot.totals.discount.cents(), 1500);
        assert!(snapshot.totals.payable.is_zero());
    }

    #[test]
    fn test_discount_can_trigger_shipping() {
        let config = CartConfig::new().shipping(Money::from_cents(5000), Money::from_cents(499));
        let mut cart = empty_cart(config);
        cart.add_item(&Product::new("p-1", "Shirt", 5500)).unwrap();
        assert!(cart.totals().shipping_charges.is_zero());

        let snapshot = cart
            .apply_discount(Discount::Amount(Money::from_cents(1000)), None)
            .unwrap();

        assert_eq!(snapshot.totals.shipping_charges.cents(), 499);
        assert_eq!(snapshot.totals.net_total.cents(), 4999);
    }

    #[test]
    fn test_invalid_discounts_rejected() {
        let mut cart = empty_cart(CartConfig::default());
        cart.add_item(&Product::new("p-1", "Shirt", 1500)).unwrap();

        let err = cart
            .apply_discount(Discount::Percentage(Percentage::from_bps(10_001)), None)
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::OutOfRange { .. })));

        let err = cart
            .apply_discount(Discount::Amount(Money::from_cents(-1)), None)
            .unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::Negative { .. })));

        assert!(cart.totals().discount.is_zero());
    }

    #[test]
    fn test_huge_price_rejected_before_any_change() {
        let mut cart = empty_cart(ten_percent_tax());
        let yacht = Product::new("p-9", "Yacht", i64::MAX / 2 + 1);

        for _ in 0..2 {
            let err = cart.add_item(&yacht).unwrap_err();
            assert!(matches!(err, CartError::Validation(ValidationError::OutOfRange { .. })));
        }

        assert!(cart.is_empty());
        assert_eq!(cart.totals(), &CartTotals::default());
        assert_eq!(cart.store().calls().len(), 1);
    }

    #[test]
    fn test_largest_cart_totals_fit() {
        let mut cart = empty_cart(ten_percent_tax());
        let item = Product::new("p-1", "Gold bar", crate::MAX_PRICE_CENTS);

        cart.add_item(&item).unwrap();
        for _ in 1..crate::MAX_ITEM_QUANTITY {
            cart.increment_quantity_at(0).unwrap();
        }

        let expected = crate::MAX_PRICE_CENTS * i64::from(crate::MAX_ITEM_QUANTITY);
        assert_eq!(cart.totals().subtotal.cents(), expected);
        assert_eq!(cart.totals().tax.cents(), expected / 10);
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = empty_cart(CartConfig::default());
        let shirt = Product::new("p-1", "Shirt", 1000);

        cart.add_item(&shirt).unwrap();
        for _ in 1..crate::MAX_ITEM_QUANTITY {
            cart.increment_quantity_at(0).unwrap();
        }
        let before = cart.snapshot(true);

        let err = cart.increment_quantity_at(0).unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::OutOfRange { .. })));
        let err = cart.add_item(&shirt).unwrap_err();
        assert!(matches!(err, CartError::Validation(ValidationError::OutOfRange { .. })));

        assert_eq!(cart.items()[0].quantity(), crate::MAX_ITEM_QUANTITY);
        assert_eq!(cart.snapshot(true), before);

        cart.decrement_quantity_at(0).unwrap();
        cart.add_item(&shirt).unwrap();
        assert_eq!(cart.items()[0].quantity(), crate::MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = empty_cart(CartConfig::default());
        for n in 0..crate::MAX_CART_ITEMS {
            cart.add_item(&Product::new(format!("p-{}", n), "Item", 100)).unwrap();
        }

        let err = cart
            .add_item(&Product::new("one-more", "Item", 100))
            .unwrap_err();

        assert!(matches!(err, CartError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(cart.item_count(), crate::MAX_CART_ITEMS);

        // Existing items can still be bumped.
        cart.add_item(&Product::new("p-0", "Item", 100)).unwrap();
        assert_eq!(cart.items()[0].quantity(), 2);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut cart = empty_cart(ten_percent_tax());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();
        cart.add_item(&Product::new("p-2", "Socks", 500)).unwrap();
        cart.store_mut().clear_calls();

        let snapshot = cart.clear().unwrap();

        assert_eq!(snapshot.items, Some(Vec::new()));
        assert!(snapshot.totals.payable.is_zero());
        let ops: Vec<StoreOp> = cart.store().calls().iter().map(StoreCall::op).collect();
        assert_eq!(
            ops,
            vec![StoreOp::RemoveItem, StoreOp::RemoveItem, StoreOp::UpdateCart]
        );

        let cart = reload(cart);
        assert!(cart.is_empty());
        assert!(cart.id().is_some());
    }

    #[test]
    fn test_clear_on_unsaved_cart_writes_nothing() {
        let mut cart = empty_cart(CartConfig::default());
        cart.clear().unwrap();

        assert_eq!(cart.store().calls().len(), 1);
        assert_eq!(cart.store().cart_count(), 0);
    }

    #[test]
    fn test_storage_failure_surfaces_unchanged() {
        let mut cart = empty_cart(CartConfig::default());
        cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap();
        cart.store_mut().fail_next(StoreOp::SetItemQuantity);

        let err = cart.increment_quantity_at(0).unwrap_err();

        match err {
            CartError::Storage(source) => {
                let store_err = source
                    .downcast_ref::<MemoryStoreError>()
                    .expect("memory store error");
                assert_eq!(
                    store_err,
                    &MemoryStoreError::Unavailable {
                        op: StoreOp::SetItemQuantity
                    }
                );
            }
            other => panic!("expected storage error, got {:?}", other),
        }

        // Nothing after the failed call reached storage.
        let stored = reload(cart);
        assert_eq!(stored.items()[0].quantity(), 1);
        assert_eq!(stored.totals().subtotal.cents(), 1000);
    }

    #[test]
    fn test_failed_first_store_leaves_nothing_persisted() {
        let mut store = MemoryCartStore::new();
        store.fail_next(StoreOp::StoreNewCart);
        let mut cart = Cart::load(store, OWNER, CartConfig::default()).unwrap();

        let err = cart.add_item(&Product::new("p-1", "Shirt", 1000)).unwrap_err();

        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(cart.id(), None);
        assert_eq!(cart.store().cart_count(), 0);
    }

    #[test]
    fn test_snapshot_serialization_shape() {
        let mut cart = empty_cart(ten_percent_tax().round_off_to(Some(RoundOffTo::FiveCents)));
        cart.add_item(&Product::new("p-1", "Shirt", 2494)).unwrap();

        let json = serde_json::to_value(cart.snapshot(false)).unwrap();
        let object = json.as_object().unwrap();

        for key in [
            "id",
            "subtotal",
            "discount",
            "discount_percentage",
            "coupon_id",
            "shipping_charges",
            "net_total",
            "tax",
            "total",
            "round_off",
            "payable",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert!(!object.contains_key("items"));

        // 24.94 + 2.49 tax = 27.43 → 27.45
        assert_eq!(json["total"], 2743);
        assert_eq!(json["payable"], 2745);
        assert_eq!(json["round_off"], -2);

        let with_items = serde_json::to_value(cart.snapshot(true)).unwrap();
        assert_eq!(with_items["items"][0]["source_id"], "p-1");
    }
}
