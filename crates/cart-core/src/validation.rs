//! # Validation Module
//!
//! Input validation for values entering the cart engine from outside:
//! settings files, environment variables, command-line arguments and
//! source entities.
//!
//! ## Where Checks Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Settings / CLI (cart-cli)                                    │
//! │  ├── Tax percentage, shipping amounts, rounding granularity           │
//! │  └── Owner key, item name and price given on the command line         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart engine (cart-core)                                      │
//! │  ├── THIS MODULE: price and quantity bounds, ranges, names           │
//! │  └── Cart: index range, name / price presence, cart size             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (price_cents >= 0), CHECK (quantity >= 1)                   │
//! │  └── Foreign keys from items to carts                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cart_core::validation::{validate_percentage, validate_price_cents};
//!
//! let tax = validate_percentage("tax_percentage", 8.25).unwrap();
//! assert_eq!(tax.bps(), 825);
//!
//! assert!(validate_price_cents("price", -100).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::store::OwnerContext;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted owner key, in characters.
pub const MAX_OWNER_KEY_LENGTH: usize = 128;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: format!("must be at most {} characters", MAX_NAME_LENGTH),
        });
    }

    Ok(name.to_string())
}

/// Validates an owner key (session id, user id, ...).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_OWNER_KEY_LENGTH`] characters
/// - No whitespace or control characters inside
pub fn validate_owner_key(key: &str) -> ValidationResult<OwnerContext> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ValidationError::Required {
            field: "owner".to_string(),
        });
    }

    if key.chars().count() > MAX_OWNER_KEY_LENGTH {
        return Err(ValidationError::InvalidFormat {
            field: "owner".to_string(),
            reason: format!("must be at most {} characters", MAX_OWNER_KEY_LENGTH),
        });
    }

    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "owner".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(OwnerContext::new(key))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects negative amounts. Zero is allowed (free items, no shipping).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<Money> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(amount)
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (zero is a free item)
/// - Must not exceed [`MAX_PRICE_CENTS`]
pub fn validate_price(field: &str, price: Money) -> ValidationResult<Money> {
    let price = validate_non_negative(field, price)?;

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(price)
}

/// Validates an amount given in cents.
///
/// ## Example
/// ```rust
/// use cart_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 1099).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<Money> {
    validate_price(field, Money::from_cents(cents))
}

/// Validates the quantity an item is about to reach.
///
/// ## Rules
/// - At least 1
/// - At most [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(qty: u32) -> ValidationResult<u32> {
    if qty == 0 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(qty)
}

/// Validates a percentage given as a decimal number (8.25 = 8.25%).
///
/// ## Rules
/// - Must be a finite number
/// - Must be between 0 and 100
///
/// Precision beyond two decimals is rounded away.
pub fn validate_percentage(field: &str, value: f64) -> ValidationResult<Percentage> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        });
    }

    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(Percentage::from_percentage(value))
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Checks that one more distinct item fits in a cart holding
/// `current_items`.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Coffee mug ").unwrap(), "Coffee mug");
        assert!(matches!(
            validate_name("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name(&"A".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_name(&"A".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_owner_key() {
        assert_eq!(validate_owner_key(" user-17 ").unwrap().as_str(), "user-17");
        assert!(validate_owner_key("").is_err());
        assert!(validate_owner_key("two words").is_err());
        assert!(validate_owner_key(&"k".repeat(MAX_OWNER_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert_eq!(validate_price_cents("price", 0).unwrap(), Money::zero());
        assert_eq!(validate_price_cents("price", 1099).unwrap().cents(), 1099);
        assert_eq!(
            validate_price_cents("shipping_charges", -1).unwrap_err(),
            ValidationError::Negative {
                field: "shipping_charges".to_string()
            }
        );

        assert!(validate_price_cents("price", MAX_PRICE_CENTS).is_ok());
        assert!(matches!(
            validate_price_cents("price", MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_price_cents("price", i64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(1).unwrap(), 1);
        assert_eq!(validate_quantity(MAX_ITEM_QUANTITY).unwrap(), MAX_ITEM_QUANTITY);
        assert!(validate_quantity(0).is_err());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { min: 1, .. })
        ));
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert_eq!(validate_percentage("tax", 0.0).unwrap().bps(), 0);
        assert_eq!(validate_percentage("tax", 8.25).unwrap().bps(), 825);
        assert_eq!(validate_percentage("tax", 100.0).unwrap().bps(), 10_000);

        assert!(matches!(
            validate_percentage("tax", 100.5),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_percentage("tax", -0.01),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_percentage("tax", f64::NAN),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
