//! # cart-core: Pure Cart Engine for Cart Manager
//!
//! This crate is the **heart** of Cart Manager. It owns the cart model, the
//! totals pipeline and the storage contract, with zero I/O of its own.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Manager Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cart-cli (Command Line)                      │   │
//! │  │    show ──► add ──► increment / decrement ──► discount ──► clear│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cart-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   money   │  │  totals   │  │   store   │  │   │
//! │  │   │   Cart    │  │   Money   │  │ pipeline  │  │ CartStore │  │   │
//! │  │   │ LineItem  │  │Percentage │  │ rounding  │  │  memory   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • STORAGE ONLY THROUGH CartStore    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cart-db (Database Layer)                     │   │
//! │  │         SQLite queries, migrations, SqliteCartStore             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - The cart and its operations
//! - [`item`] - Line items and the [`PricedEntity`] capability
//! - [`totals`] - The totals pipeline
//! - [`config`] - Tax, shipping and rounding configuration
//! - [`store`] - The [`CartStore`] contract and an in-memory store
//! - [`money`] - Money and percentages with integer arithmetic
//! - [`types`] - Ready-made priced entities
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: amounts are cents (i64), percentages basis points
//! 2. **Derived Totals**: every total is recomputed from the items on change
//! 3. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_core::{Cart, CartConfig, MemoryCartStore, Percentage, Product};
//!
//! let config = CartConfig::new().tax_percentage(Percentage::from_bps(1000)); // 10%
//! let mut cart = Cart::load(MemoryCartStore::new(), "session-1", config).unwrap();
//!
//! let shirt = Product::new("p-1", "Shirt", 1000);
//! cart.add_item(&shirt).unwrap();
//! let snapshot = cart.add_item(&shirt).unwrap();
//!
//! assert_eq!(snapshot.totals.subtotal.cents(), 2000);
//! assert_eq!(snapshot.totals.tax.cents(), 200);
//! assert_eq!(snapshot.totals.payable.cents(), 2200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod config;
pub mod error;
pub mod item;
pub mod money;
pub mod store;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Limits
// =============================================================================

/// Maximum number of distinct items in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum unit price, in cents (10,000,000.00).
///
/// Together with the two limits above this keeps every cart total well
/// inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cart_core::Cart` instead of
// `use cart_core::cart::Cart`

pub use cart::{Cart, CartSnapshot, Discount};
pub use config::{CartConfig, RoundOffTo};
pub use error::{CartError, CartResult, ValidationError};
pub use item::{EntityAttributes, ItemRecord, LineItem, PricedEntity};
pub use money::{Money, Percentage};
pub use store::{CartStore, MemoryCartStore, OwnerContext, PersistedCart};
pub use totals::{CartTotals, DiscountPolicy};
pub use types::*;
