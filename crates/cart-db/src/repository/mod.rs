//! # Repository Module
//!
//! Database repository implementations for Cart Manager.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteCartStore (CartStore for the engine)                            │
//! │       │                                                                 │
//! │       │  db.carts().get_by_owner(&owner)                               │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── get_by_owner(&self, owner)                                        │
//! │  ├── insert_cart(&self, owner, snapshot)                               │
//! │  ├── update_totals(&self, cart_id, totals)                             │
//! │  ├── insert_item / set_item_quantity / delete_item                     │
//! │  └── delete_by_owner(&self, owner)                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart::CartRepository`] - Carts and cart items

pub mod cart;
