//! # Error Types
//!
//! Domain-specific error types for cart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cart-core errors (this file)                                          │
//! │  ├── CartError        - Rejected cart operations                       │
//! │  └── ValidationError  - Input / config validation failures            │
//! │                                                                         │
//! │  Storage errors (collaborator-defined)                                 │
//! │  ├── MemoryStoreError - store::memory                                  │
//! │  └── DbError          - cart-db                                        │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        Store::Error ────┴──► CartError ──► caller                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are boxed into [`CartError::Storage`] untouched, so the
//! caller can still downcast to the concrete store error.

use std::error::Error as StdError;

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors returned by cart operations.
///
/// Every variant aborts the operation that raised it. Index and entity
/// problems are detected before the cart is touched; storage failures leave
/// the in-memory cart stale, and it should be reloaded.
#[derive(Debug, Error)]
pub enum CartError {
    /// The source entity exposes neither a name accessor nor a name attribute.
    #[error("Cart item name is missing for {source_type}")]
    MissingName { source_type: String },

    /// The source entity exposes neither a price accessor nor a price attribute.
    #[error("Cart item price is missing for {source_type}")]
    MissingPrice { source_type: String },

    /// An index-based operation referenced a position outside the cart.
    #[error("Cart item index {index} is out of range (cart has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage collaborator failed; the original error is the source.
    #[error("Cart storage failed: {0}")]
    Storage(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl CartError {
    /// Wraps a storage collaborator error.
    pub fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CartError::Storage(Box::new(err))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised for item fields, discount arguments and configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Monetary value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., an unknown rounding granularity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
