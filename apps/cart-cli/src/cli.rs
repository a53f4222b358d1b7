//! Command line arguments and the cart operation each subcommand runs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cart_core::validation::{validate_name, validate_owner_key, validate_percentage};
use cart_core::{
    Cart, CartConfig, CartResult, CartSnapshot, CartStore, Discount, Money, OwnerContext,
    SourceEntity,
};
use cart_db::{Database, DbConfig};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "cart", about = "Shopping cart manager", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (default: ./cart.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the settings
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Owner of the cart (session or user key)
    #[arg(long, global = true, default_value = "default")]
    owner: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the cart
    Show,
    /// Add one unit of an entity
    Add(AddArgs),
    /// Remove the item at a position
    Remove { index: usize },
    /// Add one to the quantity of the item at a position
    Increment { index: usize },
    /// Take one off the quantity of the item at a position
    Decrement { index: usize },
    /// Apply a discount until the next content change
    Discount(DiscountArgs),
    /// Remove every item
    Clear,
    /// Print database health and migration state
    Status,
}

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Entity type, e.g. "product"
    #[arg(long, default_value = "product")]
    source_type: String,

    /// Entity id within its type
    #[arg(long)]
    source_id: String,

    /// Display name
    #[arg(long)]
    name: Option<String>,

    /// Unit price in cents
    #[arg(long)]
    price_cents: Option<i64>,
}

#[derive(Debug, Args)]
pub(crate) struct DiscountArgs {
    /// Percentage of the subtotal, e.g. 12.5
    #[arg(
        long,
        conflicts_with = "amount_cents",
        required_unless_present = "amount_cents"
    )]
    percent: Option<f64>,

    /// Fixed amount in cents, capped at the subtotal
    #[arg(long, required_unless_present = "percent")]
    amount_cents: Option<i64>,

    /// Coupon recorded with the discount
    #[arg(long)]
    coupon: Option<String>,
}

impl Cli {
    pub(crate) fn run(self) -> anyhow::Result<()> {
        let output = self.execute()?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// Runs the command against the configured database and returns the
    /// JSON document to print.
    pub(crate) fn execute(self) -> anyhow::Result<serde_json::Value> {
        let settings = Settings::load(self.config.as_deref()).context("failed to load settings")?;
        let config = settings.cart_config()?;
        let owner = validate_owner_key(&self.owner)?;
        let database_path = self.db.unwrap_or(settings.database_path);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start runtime")?;
        let db = runtime
            .block_on(Database::new(DbConfig::new(&database_path)))
            .with_context(|| format!("failed to open {}", database_path.display()))?;

        let output = match self.command {
            Command::Status => runtime.block_on(status(&db, &database_path)),
            command => {
                info!(owner = %owner, command = ?command, "Running cart command");
                let store = db.cart_store(runtime.handle().clone());
                run_on_cart(command, store, owner, config)
            }
        };
        runtime.block_on(db.close());

        output
    }
}

/// Database report printed by `cart status`.
#[derive(Debug, Serialize)]
struct StatusReport {
    database_path: PathBuf,
    healthy: bool,
    migrations_total: usize,
    migrations_applied: usize,
}

async fn status(db: &Database, database_path: &Path) -> anyhow::Result<serde_json::Value> {
    let (migrations_total, migrations_applied) = db.migration_status().await?;
    let report = StatusReport {
        database_path: database_path.to_path_buf(),
        healthy: db.health_check().await,
        migrations_total,
        migrations_applied,
    };

    Ok(serde_json::to_value(report)?)
}

fn run_on_cart<S: CartStore>(
    command: Command,
    store: S,
    owner: OwnerContext,
    config: CartConfig,
) -> anyhow::Result<serde_json::Value> {
    let mut cart = Cart::load(store, owner, config)?;
    let snapshot = command.execute(&mut cart)?;

    debug!(
        items = cart.item_count(),
        quantity = cart.total_quantity(),
        payable = %snapshot.totals.payable,
        "Cart command complete"
    );

    Ok(serde_json::to_value(snapshot)?)
}

impl Command {
    /// Runs the operation against `cart` and returns the resulting snapshot.
    pub(crate) fn execute<S: CartStore>(self, cart: &mut Cart<S>) -> CartResult<CartSnapshot> {
        match self {
            Command::Show | Command::Status => Ok(cart.snapshot(true)),
            Command::Add(args) => {
                let mut entity = SourceEntity::new(args.source_type, args.source_id);
                if let Some(name) = args.name {
                    entity = entity.with_name(validate_name(&name)?);
                }
                if let Some(cents) = args.price_cents {
                    entity = entity.with_price(Money::from_cents(cents));
                }
                debug!(?entity, "Adding entity");
                cart.add_item(&entity)
            }
            Command::Remove { index } => cart.remove_at(index),
            Command::Increment { index } => cart.increment_quantity_at(index),
            Command::Decrement { index } => cart.decrement_quantity_at(index),
            Command::Discount(args) => {
                let discount = match (args.percent, args.amount_cents) {
                    (Some(percent), _) => {
                        Discount::Percentage(validate_percentage("percent", percent)?)
                    }
                    (None, Some(cents)) => Discount::Amount(Money::from_cents(cents)),
                    (None, None) => Discount::Amount(Money::zero()),
                };
                cart.apply_discount(discount, args.coupon)
            }
            Command::Clear => cart.clear(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
