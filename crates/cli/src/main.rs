//! RocketShoes CLI - Inspect and change the local cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart and its subtotal
//! cart show
//!
//! # Add one unit of product 1 (checked against stock)
//! cart add 1
//!
//! # Set product 1 to 3 units
//! cart update 1 3
//!
//! # Remove product 1
//! cart remove 1
//!
//! # List stock and catalog
//! cart stock
//! cart products
//! ```
//!
//! Configuration comes from the environment (see `rocketshoes_cart::config`).
//! Notifications are printed to stderr; the process exits with status 1 when
//! an operation was rejected or failed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rocketshoes_cart::{CartConfig, CartStore, FileStorage, NotificationQueue, StorefrontApi};
use rocketshoes_core::ProductId;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::CartAction;

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product id
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product id
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Catalog product id
        product_id: ProductId,

        /// New quantity (0 is ignored)
        amount: u32,
    },
    /// List available stock
    Stock,
    /// List catalog products
    Products,
}

#[tokio::main]
async fn main() {
    // Load configuration first so RUST_LOG from .env applies
    let config = CartConfig::from_env();

    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, logging to stderr.
///
/// Set `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=warn,rocketshoes_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = Arc::new(StorefrontApi::new(&config.api)?);

    let action = match cli.command {
        Commands::Stock => return Ok(commands::catalog::stock(api.as_ref()).await?),
        Commands::Products => {
            return Ok(commands::catalog::products(api.as_ref(), config.locale).await?);
        }
        Commands::Show => CartAction::Show,
        Commands::Add { product_id } => CartAction::Add(product_id),
        Commands::Remove { product_id } => CartAction::Remove(product_id),
        Commands::Update { product_id, amount } => CartAction::Update(product_id, amount),
    };

    tracing::debug!(config = ?config, "Opening cart");
    let queue = Arc::new(NotificationQueue::new());
    let storage = Arc::new(FileStorage::new(&config.storage_dir));
    let store = CartStore::builder(api.clone(), api)
        .locale(config.locale)
        .notifier(queue.clone())
        .persistence(storage, config.cart_key())
        .build();

    commands::cart::run(&store, &queue, action).await?;
    Ok(())
}
