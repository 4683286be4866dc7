//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::orders::types::PRICE_BASE;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Sniper tasks registered at startup
    #[serde(default)]
    pub snipers: Vec<SniperTaskConfig>,
    /// Limit orders registered at startup
    #[serde(default)]
    pub limit_orders: Vec<LimitOrderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    /// Capacity of the dispatcher's event queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            ping_interval_secs: default_ping_interval_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Path to the solana-keygen JSON keypair used by config-declared intents
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

/// Declarative sniper task registration
#[derive(Debug, Clone, Deserialize)]
pub struct SniperTaskConfig {
    /// Exact ticker to match; omit to match every new token
    #[serde(default)]
    pub ticker: Option<String>,
    /// Buy amount in SOL
    pub buy_amount_sol: f64,
}

/// Declarative limit order registration
#[derive(Debug, Clone, Deserialize)]
pub struct LimitOrderConfig {
    /// Token mint address
    pub mint: String,
    /// Order direction
    pub side: OrderSide,
    /// Quantity in base units: lamports for buys, token units for sells
    pub amount: u64,
    /// Limit price in SOL per token
    pub limit_price_sol: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn is_buy(self) -> bool {
        matches!(self, OrderSide::Buy)
    }
}

// Default value functions
fn default_rpc_endpoint() -> String {
    std::env::var("RPC_ENDPOINT").unwrap_or_default()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_ws_url() -> String {
    "wss://pumpportal.fun/api/data".into()
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_ping_interval_secs() -> u64 {
    30
}

fn default_queue_capacity() -> usize {
    10000
}

fn default_keypair_path() -> String {
    "credentials/keypair.json".into()
}

/// Convert SOL to lamports
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * 1e9) as u64
}

/// Convert a SOL-per-token price to the fixed-point scale
pub fn sol_price_to_fixed(price_sol: f64) -> u64 {
    (price_sol * PRICE_BASE as f64) as u64
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix ORDERDESK_)
            .add_source(
                config::Environment::with_prefix("ORDERDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.rpc.endpoint.is_empty() {
            anyhow::bail!(
                "No RPC endpoint configured. Set RPC_ENDPOINT in .env or rpc.endpoint in config.toml.\n\
                 Example: RPC_ENDPOINT=https://mainnet.helius-rpc.com/?api-key=<your api key>\n\
                 Get one at: https://www.helius.dev"
            );
        }

        for sniper in &self.snipers {
            if sniper.buy_amount_sol <= 0.0 {
                anyhow::bail!("sniper buy_amount_sol must be positive");
            }
        }

        for order in &self.limit_orders {
            if order.amount == 0 {
                anyhow::bail!("limit order amount must be positive (mint {})", order.mint);
            }
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  RPC:
    endpoint: {}
    timeout: {}ms
  Stream:
    ws_url: {}
    reconnect_delay: {}ms
    queue_capacity: {}
  Wallet:
    keypair_path: {}
  Intents:
    sniper tasks: {}
    limit orders: {}
"#,
            mask_url(&self.rpc.endpoint),
            self.rpc.timeout_ms,
            self.stream.ws_url,
            self.stream.reconnect_delay_ms,
            self.stream.queue_capacity,
            self.wallet.keypair_path,
            self.snipers.len(),
            self.limit_orders.len(),
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            stream: StreamConfig::default(),
            wallet: WalletConfig::default(),
            snipers: vec![],
            limit_orders: vec![],
        }
    }
}
