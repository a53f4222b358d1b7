//! # Settings
//!
//! Layered CLI settings, turned into a validated [`CartConfig`].
//!
//! ## Sources (later wins)
//! 1. Defaults (this file)
//! 2. Settings file: `--config <path>`, or `cart.toml` in the working
//!    directory when present
//! 3. Environment variables: `CART_DATABASE_PATH`,
//!    `CART_CART__TAX_PERCENTAGE`, `CART_CART__ROUND_OFF_TO`, ...
//!
//! ## Example `cart.toml`
//! ```toml
//! database_path = "carts.db"
//!
//! [cart]
//! tax_percentage = 8.25
//! shipping_charges_threshold_cents = 5000
//! shipping_charges_cents = 499
//! round_off_to = "0.05"
//! ```

use std::path::{Path, PathBuf};

use cart_core::validation::{validate_percentage, validate_price_cents};
use cart_core::{CartConfig, RoundOffTo, ValidationError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Settings file looked up in the working directory (any supported extension).
pub const DEFAULT_CONFIG_FILE: &str = "cart";

pub const DEFAULT_DATABASE_PATH: &str = "carts.db";

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Invalid(#[from] ValidationError),
}

/// Pricing settings, in the units they are written in.
#[derive(Debug, Clone, Deserialize)]
pub struct CartSettings {
    /// Percent, e.g. 8.25
    pub tax_percentage: f64,
    pub shipping_charges_threshold_cents: i64,
    pub shipping_charges_cents: i64,
    /// "0.05", "0.1", "0.5" or "1"; empty or absent disables rounding.
    #[serde(default)]
    pub round_off_to: Option<String>,
}

/// All CLI settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_path: PathBuf,
    pub cart: CartSettings,
}

impl Settings {
    /// Loads settings from defaults, the settings file and the environment.
    ///
    /// An explicit `path` must exist; the default `cart.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = Self::defaults()?.add_source(file).add_source(
            Environment::with_prefix("CART")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("cart.tax_percentage", 0.0)?
            .set_default("cart.shipping_charges_threshold_cents", 0_i64)?
            .set_default("cart.shipping_charges_cents", 0_i64)?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validates the pricing settings and builds the cart configuration.
    pub fn cart_config(&self) -> Result<CartConfig, SettingsError> {
        let cart = &self.cart;

        let tax = validate_percentage("cart.tax_percentage", cart.tax_percentage)?;
        let threshold = validate_price_cents(
            "cart.shipping_charges_threshold_cents",
            cart.shipping_charges_threshold_cents,
        )?;
        let charges =
            validate_price_cents("cart.shipping_charges_cents", cart.shipping_charges_cents)?;

        let round_off_to = match cart.round_off_to.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<RoundOffTo>()?),
        };

        Ok(CartConfig::new()
            .tax_percentage(tax)
            .shipping(threshold, charges)
            .round_off_to(round_off_to))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
