//! Pump.fun Order Desk - sniper tasks and limit orders over live events
//!
//! # WARNING
//! - This bot trades with real money. Only use funds you can afford to lose.
//! - Most pump.fun tokens go to zero (rug pulls, abandonment).
//! - A triggered order is attempted exactly once; failures are not retried.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use pumpfun_orderdesk::cli::commands;
use pumpfun_orderdesk::config::Config;

/// Pump.fun Order Desk - sniper tasks and limit orders
#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start dispatching events against the registered intents
    Start {
        /// Run in dry-run mode (no real trades)
        #[arg(long)]
        dry_run: bool,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pumpfun_orderdesk=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; missing required settings are fatal here, before
    // any subscription is opened.
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Start { dry_run } => commands::start(&config, dry_run).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
