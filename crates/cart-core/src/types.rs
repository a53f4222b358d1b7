//! # Domain Types
//!
//! Ready-made [`PricedEntity`] implementations.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Priced Entities                                 │
//! │                                                                         │
//! │  ┌──────────────────────────┐       ┌──────────────────────────┐       │
//! │  │    Product               │       │    SourceEntity          │       │
//! │  │  ──────────────────────  │       │  ──────────────────────  │       │
//! │  │  id      (source id)     │       │  source_type             │       │
//! │  │  name         [accessor] │       │  source_id               │       │
//! │  │  price_cents  [accessor] │       │  name   [attribute, opt] │       │
//! │  │                          │       │  price  [attribute, opt] │       │
//! │  └──────────────────────────┘       └──────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Product` is a catalogue entry with a fixed source type. `SourceEntity`
//! describes any external record by its type and id, with name and price
//! that may be missing; the cart rejects it when they are.

use serde::{Deserialize, Serialize};

use crate::item::{EntityAttributes, PricedEntity};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier, used as the cart source id.
    pub id: String,

    /// Display name shown in the cart.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
}

impl Product {
    /// Source type recorded on cart items built from products.
    pub const SOURCE_TYPE: &'static str = "product";

    pub fn new(id: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price_cents,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

impl PricedEntity for Product {
    fn source_type(&self) -> &str {
        Self::SOURCE_TYPE
    }

    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn unit_price(&self) -> Option<Money> {
        Some(self.price())
    }
}

// =============================================================================
// Source Entity
// =============================================================================

/// An arbitrary external record addressed by type and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntity {
    pub source_type: String,
    pub source_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
}

impl SourceEntity {
    pub fn new(source_type: impl Into<String>, source_id: impl Into<String>) -> Self {
        SourceEntity {
            source_type: source_type.into(),
            source_id: source_id.into(),
            name: None,
            price: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }
}

impl PricedEntity for SourceEntity {
    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn source_id(&self) -> String {
        self.source_id.clone()
    }

    fn attributes(&self) -> EntityAttributes<'_> {
        EntityAttributes {
            name: self.name.as_deref(),
            price: self.price,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
