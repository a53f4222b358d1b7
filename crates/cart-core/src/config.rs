//! # Cart Configuration
//!
//! The four values the totals pipeline reads, injected into every
//! [`crate::cart::Cart`] at construction.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────┐
//! │ tax_percentage               │ tax = net_total × pct / 100          │
//! │ shipping_charges_threshold   │ ship only while 0 < order < this     │
//! │ shipping_charges             │ flat charge (0 = never charge)       │
//! │ round_off_to                 │ 0.05 | 0.1 | 0.5 | 1 | unset         │
//! └──────────────────────────────┴──────────────────────────────────────┘
//! ```
//!
//! Loading these from files or the environment is the caller's job; see
//! the cart-cli `settings` module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::{Money, Percentage};

// =============================================================================
// Rounding Policy
// =============================================================================

/// Granularity the payable amount is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOffTo {
    /// Nearest 0.05
    #[serde(rename = "0.05")]
    FiveCents,
    /// Nearest 0.1
    #[serde(rename = "0.1")]
    TenCents,
    /// Nearest 0.5
    #[serde(rename = "0.5")]
    HalfUnit,
    /// Nearest whole unit
    #[serde(rename = "1")]
    WholeUnit,
}

impl RoundOffTo {
    /// Size of one rounding step in cents.
    pub const fn step_cents(self) -> i64 {
        match self {
            RoundOffTo::FiveCents => 5,
            RoundOffTo::TenCents => 10,
            RoundOffTo::HalfUnit => 50,
            RoundOffTo::WholeUnit => 100,
        }
    }

    /// Rounds `total` to this granularity, half away from zero.
    pub fn apply(self, total: Money) -> Money {
        total.round_to_multiple(self.step_cents())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RoundOffTo::FiveCents => "0.05",
            RoundOffTo::TenCents => "0.1",
            RoundOffTo::HalfUnit => "0.5",
            RoundOffTo::WholeUnit => "1",
        }
    }
}

impl FromStr for RoundOffTo {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "0.05" | ".05" => Ok(RoundOffTo::FiveCents),
            "0.1" | "0.10" | ".1" => Ok(RoundOffTo::TenCents),
            "0.5" | "0.50" | ".5" => Ok(RoundOffTo::HalfUnit),
            "1" | "1.0" | "1.00" => Ok(RoundOffTo::WholeUnit),
            other => Err(ValidationError::InvalidFormat {
                field: "round_off_to".to_string(),
                reason: format!("expected one of 0.05, 0.1, 0.5, 1 but got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for RoundOffTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Cart Config
// =============================================================================

/// Configuration consumed by the totals pipeline.
///
/// The default charges no tax, never adds shipping and leaves the payable
/// amount unrounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    pub tax_percentage: Percentage,
    pub shipping_charges_threshold: Money,
    pub shipping_charges: Money,
    #[serde(default)]
    pub round_off_to: Option<RoundOffTo>,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tax percentage.
    pub fn tax_percentage(mut self, pct: Percentage) -> Self {
        self.tax_percentage = pct;
        self
    }

    /// Sets the shipping threshold and the flat shipping charge.
    pub fn shipping(mut self, threshold: Money, charges: Money) -> Self {
        self.shipping_charges_threshold = threshold;
        self.shipping_charges = charges;
        self
    }

    /// Sets the rounding granularity (`None` leaves totals unrounded).
    pub fn round_off_to(mut self, granularity: Option<RoundOffTo>) -> Self {
        self.round_off_to = granularity;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_off_parsing() {
        assert_eq!("0.05".parse::<RoundOffTo>().unwrap(), RoundOffTo::FiveCents);
        assert_eq!("0.1".parse::<RoundOffTo>().unwrap(), RoundOffTo::TenCents);
        assert_eq!(" 0.5 ".parse::<RoundOffTo>().unwrap(), RoundOffTo::HalfUnit);
        assert_eq!("1".parse::<RoundOffTo>().unwrap(), RoundOffTo::WholeUnit);

        let err = "0.25".parse::<RoundOffTo>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_round_off_apply() {
        let total = Money::from_cents(2743);
        assert_eq!(RoundOffTo::FiveCents.apply(total).cents(), 2745);
        assert_eq!(RoundOffTo::TenCents.apply(total).cents(), 2740);
        assert_eq!(RoundOffTo::HalfUnit.apply(total).cents(), 2750);
        assert_eq!(RoundOffTo::WholeUnit.apply(total).cents(), 2700);
    }

    #[test]
    fn test_round_off_serde_uses_granularity_strings() {
        let json = serde_json::to_string(&RoundOffTo::FiveCents).unwrap();
        assert_eq!(json, "\"0.05\"");

        let parsed: RoundOffTo = serde_json::from_str("\"0.5\"").unwrap();
        assert_eq!(parsed, RoundOffTo::HalfUnit);
    }

    #[test]
    fn test_config_builder() {
        let config = CartConfig::new()
            .tax_percentage(Percentage::from_bps(1000))
            .shipping(Money::from_cents(5000), Money::from_cents(499))
            .round_off_to(Some(RoundOffTo::TenCents));

        assert_eq!(config.tax_percentage.bps(), 1000);
        assert_eq!(config.shipping_charges_threshold.cents(), 5000);
        assert_eq!(config.shipping_charges.cents(), 499);
        assert_eq!(config.round_off_to, Some(RoundOffTo::TenCents));

        let default = CartConfig::default();
        assert!(default.tax_percentage.is_zero());
        assert_eq!(default.round_off_to, None);
    }
}
