//! CLI command implementations

use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{sol_price_to_fixed, sol_to_lamports, Config};
use crate::dispatcher::Dispatcher;
use crate::executor::Executor;
use crate::orders::store::OrderStore;
use crate::orders::types::TickerFilter;
use crate::stream::pumpportal::{PumpStreamClient, PumpStreamConfig};
use crate::trading::{DryRunTrader, PumpClient, PumpPortalTrader};
use crate::wallet;

/// Start the order desk
pub async fn start(config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Running in DRY-RUN mode - no real trades will be executed");
    }

    info!("Starting pump.fun order desk...");

    // Load the signing credential: base58 env secret wins over the file.
    let keypair = match std::env::var("PRIVATE_KEY") {
        Ok(secret) => wallet::keypair_from_base58(&secret)?,
        Err(_) => wallet::load_keypair(Path::new(&config.wallet.keypair_path))?,
    };
    let credential = Arc::new(keypair);

    // Initialize the trading collaborator
    let client: Arc<dyn PumpClient> = if dry_run {
        Arc::new(DryRunTrader)
    } else {
        let rpc = Arc::new(
            solana_client::nonblocking::rpc_client::RpcClient::new_with_timeout(
                config.rpc.endpoint.clone(),
                Duration::from_millis(config.rpc.timeout_ms),
            ),
        );
        Arc::new(PumpPortalTrader::new(rpc))
    };

    // Register config-declared intents
    let mut store = OrderStore::new();

    for sniper in &config.snipers {
        let filter = match &sniper.ticker {
            Some(ticker) => TickerFilter::symbol(ticker.clone()),
            None => TickerFilter::any(),
        };
        store.add_sniper_task(
            filter,
            credential.clone(),
            sol_to_lamports(sniper.buy_amount_sol),
        );
    }

    let mut trade_mints: Vec<String> = Vec::new();
    for order in &config.limit_orders {
        let mint: Pubkey = order
            .mint
            .parse()
            .with_context(|| format!("Invalid mint address: {}", order.mint))?;
        store.add_limit_order(
            mint,
            order.amount,
            order.side.is_buy(),
            sol_price_to_fixed(order.limit_price_sol),
            credential.clone(),
        )?;
        if !trade_mints.contains(&order.mint) {
            trade_mints.push(order.mint.clone());
        }
    }

    info!(
        "Registered {} sniper task(s), {} limit order(s)",
        store.sniper_tasks().len(),
        store.limit_orders().len()
    );

    // Wire the event queue and start the stream
    let (event_tx, event_rx) = mpsc::channel(config.stream.queue_capacity);

    let stream_config = PumpStreamConfig {
        ws_url: config.stream.ws_url.clone(),
        reconnect_delay_ms: config.stream.reconnect_delay_ms,
        max_reconnect_attempts: config.stream.max_reconnect_attempts,
        ping_interval_secs: config.stream.ping_interval_secs,
    };
    let stream_client = PumpStreamClient::new(stream_config, event_tx);
    stream_client.start(true, trade_mints).await?;

    // Run the serialized dispatch loop until the stream closes for good
    let dispatcher = Dispatcher::new(store, Executor::new(client));
    dispatcher.run(event_rx).await;

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
