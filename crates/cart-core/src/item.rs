//! # Line Items
//!
//! One priced, quantified cart entry, and the capability a source entity
//! needs in order to become one.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PricedEntity (product, gift card, ...)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LineItem::from_entity()  ── resolves name/price, quantity = 1, no id  │
//! │                                                                         │
//! │  ItemRecord (loaded from storage)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LineItem::from_record()  ── trusted, copied field by field            │
//! │                                                                         │
//! │  LineItem::to_record() ──► ItemRecord ──► storage / snapshot output    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Name / Price Resolution
//! An entity can supply its name and price through an explicit accessor
//! (`display_name`, `unit_price`) or through plain attributes
//! (`attributes`). The accessor wins. With neither, construction fails with
//! [`CartError::MissingName`] / [`CartError::MissingPrice`].

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::validation::{validate_price, validate_quantity, ValidationResult};

// =============================================================================
// Priced Entity
// =============================================================================

/// Plain name/price attributes exposed by an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityAttributes<'a> {
    pub name: Option<&'a str>,
    pub price: Option<Money>,
}

/// Anything that can be put in a cart.
///
/// `source_type` and `source_id` together identify the entity; adding the
/// same pair twice bumps the quantity instead of creating a second line.
///
/// ## Implementing
/// ```rust
/// use cart_core::item::PricedEntity;
/// use cart_core::money::Money;
///
/// struct GiftCard { code: String, face_value_cents: i64 }
///
/// impl PricedEntity for GiftCard {
///     fn source_type(&self) -> &str { "gift_card" }
///     fn source_id(&self) -> String { self.code.clone() }
///     fn display_name(&self) -> Option<String> { Some(format!("Gift card {}", self.code)) }
///     fn unit_price(&self) -> Option<Money> { Some(Money::from_cents(self.face_value_cents)) }
/// }
/// ```
pub trait PricedEntity {
    /// Discriminator naming the kind of entity.
    fn source_type(&self) -> &str;

    /// Stable identifier of the entity within its type.
    fn source_id(&self) -> String;

    /// Explicit name accessor.
    fn display_name(&self) -> Option<String> {
        None
    }

    /// Explicit price accessor.
    fn unit_price(&self) -> Option<Money> {
        None
    }

    /// Plain attributes, consulted when an accessor returns `None`.
    fn attributes(&self) -> EntityAttributes<'_> {
        EntityAttributes::default()
    }
}

// =============================================================================
// Item Record
// =============================================================================

/// Serialized form of a line item, as stored and as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source_type: String,
    pub source_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

// =============================================================================
// Line Item
// =============================================================================

/// One cart entry.
///
/// The shape is fixed at construction; only the quantity changes afterwards,
/// and only through the owning [`crate::cart::Cart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: Option<String>,
    source_type: String,
    source_id: String,
    name: String,
    price: Money,
    quantity: u32,
}

impl LineItem {
    /// Builds a new, not yet persisted item from a source entity.
    ///
    /// ## Errors
    /// - [`CartError::MissingName`] when no non-empty name can be resolved
    /// - [`CartError::MissingPrice`] when no price can be resolved
    /// - [`CartError::Validation`] when the resolved price is negative or above
///   [`crate::MAX_PRICE_CENTS`]
    pub fn from_entity<E>(entity: &E) -> CartResult<Self>
    where
        E: PricedEntity + ?Sized,
    {
        let source_type = entity.source_type().to_string();
        let attributes = entity.attributes();

        let name = entity
            .display_name()
            .or_else(|| attributes.name.map(str::to_string))
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| CartError::MissingName {
                source_type: source_type.clone(),
            })?;

        let price = entity
            .unit_price()
            .or(attributes.price)
            .ok_or_else(|| CartError::MissingPrice {
                source_type: source_type.clone(),
            })?;
        let price = validate_price("price", price)?;

        Ok(LineItem {
            id: None,
            source_id: entity.source_id(),
            source_type,
            name,
            price,
            quantity: 1,
        })
    }

    /// Rebuilds an item from a persisted record. No validation: storage is
    /// trusted.
    pub fn from_record(record: ItemRecord) -> Self {
        LineItem {
            id: record.id,
            source_type: record.source_type,
            source_id: record.source_id,
            name: record.name,
            price: record.price,
            quantity: record.quantity,
        }
    }

    /// Serializes the item. `id` is included only once persisted.
    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id.clone(),
            source_type: self.source_type.clone(),
            source_id: self.source_id.clone(),
            name: self.name.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }

    /// Checks whether this item represents the given entity.
    pub fn represents<E>(&self, entity: &E) -> bool
    where
        E: PricedEntity + ?Sized,
    {
        self.source_type == entity.source_type() && self.source_id == entity.source_id()
    }

    /// `price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }

    /// Leaves the quantity unchanged when it is already at
    /// [`crate::MAX_ITEM_QUANTITY`].
    pub(crate) fn increment(&mut self) -> ValidationResult<()> {
        self.quantity = validate_quantity(self.quantity.saturating_add(1))?;
        Ok(())
    }

    /// Callers route quantity 1 to removal instead.
    pub(crate) fn decrement(&mut self) {
        debug_assert!(self.quantity > 1);
        self.quantity -= 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
