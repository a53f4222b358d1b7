//! # cart: Cart Manager Command Line
//!
//! Runs one cart operation per invocation against a SQLite database and
//! prints the resulting cart as JSON.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Command Startup                                   │
//! │                                                                         │
//! │  1. init_tracing()        RUST_LOG or "info,cart=debug,sqlx=warn"      │
//! │  2. Cli::parse()          clap                                         │
//! │  3. Settings::load()      defaults → cart.toml → CART_* env            │
//! │  4. Database::new()       SQLite + migrations                          │
//! │  5. Cart::load()          owner's cart via SqliteCartStore             │
//! │  6. Command::execute()    one operation (`status` skips the cart)      │
//! │  7. print snapshot        pretty JSON on stdout                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    init_tracing();
    Cli::parse().run()
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=cart=trace` - Show trace for cart crates only
/// - Default: INFO, with debug for the cart crates
///
/// Logs go to stderr; stdout carries only the JSON snapshot.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cart=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
