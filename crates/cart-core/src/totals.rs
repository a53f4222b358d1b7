//! # Totals Pipeline
//!
//! Derives every cart total from the items, the current discount state and
//! the [`CartConfig`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal        = Σ price × quantity                               │
//! │  2. discount        = kept (Retain) or zeroed with coupon (Reset)      │
//! │  3. shipping        = charge if 0 < subtotal - discount < threshold    │
//! │  4. net_total       = subtotal - discount + shipping                   │
//! │  5. tax             = round(net_total × tax% / 100, 2)                 │
//! │  6. total           = net_total + tax                                  │
//! │  7. payable         = total rounded to round_off_to (or total)         │
//! │     round_off       = total - payable                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money is held in cents, so steps 1, 4 and 6 are exact. Only steps 5 and 7
//! round.

use serde::{Deserialize, Serialize};

use crate::config::CartConfig;
use crate::item::LineItem;
use crate::money::{Money, Percentage};

/// Whether a recalculation keeps the currently applied discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountPolicy {
    /// Drop discount, discount percentage and coupon. Every content change
    /// recalculates this way.
    #[default]
    Reset,
    /// Keep the applied discount amount, percentage and coupon.
    Retain,
}

/// The derived fields of a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub discount_percentage: Percentage,
    pub coupon_id: Option<String>,
    pub shipping_charges: Money,
    pub net_total: Money,
    pub tax: Money,
    pub total: Money,
    pub round_off: Money,
    pub payable: Money,
}

/// Runs the full pipeline.
///
/// `current` supplies the discount state kept under
/// [`DiscountPolicy::Retain`]; none of its other fields are read.
pub fn calculate(
    items: &[LineItem],
    current: &CartTotals,
    policy: DiscountPolicy,
    config: &CartConfig,
) -> CartTotals {
    let subtotal: Money = items.iter().map(LineItem::line_total).sum();

    let (discount, discount_percentage, coupon_id) = match policy {
        DiscountPolicy::Reset => (Money::zero(), Percentage::zero(), None),
        DiscountPolicy::Retain => (
            current.discount,
            current.discount_percentage,
            current.coupon_id.clone(),
        ),
    };

    let shipping_charges = shipping_for(subtotal - discount, config);
    let net_total = subtotal - discount + shipping_charges;
    let tax = net_total.percent_of(config.tax_percentage);
    let total = net_total + tax;

    let payable = match config.round_off_to {
        Some(granularity) => granularity.apply(total),
        None => total,
    };

    CartTotals {
        subtotal,
        discount,
        discount_percentage,
        coupon_id,
        shipping_charges,
        net_total,
        tax,
        total,
        round_off: total - payable,
        payable,
    }
}

/// Flat shipping while `0 < order_amount < threshold`, if the charge is positive.
fn shipping_for(order_amount: Money, config: &CartConfig) -> Money {
    let in_range =
        order_amount.is_positive() && order_amount < config.shipping_charges_threshold;

    if in_range && config.shipping_charges.is_positive() {
        config.shipping_charges
    } else {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
