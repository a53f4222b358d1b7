//! # cart-db: Database Layer for Cart Manager
//!
//! This crate stores carts in SQLite with sqlx, and adapts that storage to
//! the synchronous [`cart_core::CartStore`] contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Manager Data Flow                            │
//! │                                                                         │
//! │  Cart::add_item (cart-core)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cart-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (cart.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CartRepo      │    │ 001_carts.sql│  │   │
//! │  │   └───────────────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                    SqliteCartStore (store.rs)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     carts, cart_items                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Cart repository
//! - [`store`] - The [`cart_core::CartStore`] implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cart_core::{Cart, CartConfig, Product};
//! use cart_db::{Database, DbConfig};
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! let db = runtime.block_on(Database::new(DbConfig::new("carts.db")))?;
//!
//! let store = db.cart_store(runtime.handle().clone());
//! let mut cart = Cart::load(store, "session-1", CartConfig::default())?;
//! cart.add_item(&Product::new("p-1", "Shirt", 1000))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::cart::CartRepository;
pub use store::SqliteCartStore;
