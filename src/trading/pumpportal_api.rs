//! PumpPortal Trading API adapter
//!
//! PumpPortal's Local Transaction API builds the pump.fun trade transaction
//! server-side and returns it unsigned; we sign with the order's own
//! credential and submit through RPC. This keeps transaction construction
//! out of process while still letting every order trade from its own wallet.
//!
//! API Documentation: https://pumpportal.fun/trading-api/

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::trading::{PriorityFee, PumpClient, TradeOutcome};

/// PumpPortal Local Transaction API endpoint
pub const PUMPPORTAL_LOCAL_API_URL: &str = "https://pumpportal.fun/api/trade-local";

/// Trade action
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// Local trade request (returns an unsigned transaction)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTradeRequest {
    /// "buy" or "sell"
    pub action: TradeAction,
    /// Token mint address
    pub mint: String,
    /// Amount (lamports for buy, token base units for sell)
    pub amount: String,
    /// true if amount is in SOL
    pub denominated_in_sol: String,
    /// Slippage percentage (e.g., 5 for 5%)
    pub slippage: u64,
    /// Priority fee in SOL
    pub priority_fee: f64,
    /// Public key of the trading wallet
    pub public_key: String,
    /// Pool to trade on
    pub pool: String,
}

/// Local trade response (unsigned transaction)
#[derive(Debug, Clone, Deserialize)]
pub struct LocalTradeResponse {
    /// Base64 encoded unsigned transaction
    pub transaction: Option<String>,
    /// Error message
    pub error: Option<String>,
}

/// PumpPortal-backed implementation of [`PumpClient`]
pub struct PumpPortalTrader {
    client: Client,
    api_url: String,
    rpc: Arc<RpcClient>,
}

impl PumpPortalTrader {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self::with_api_url(rpc, PUMPPORTAL_LOCAL_API_URL.to_string())
    }

    pub fn with_api_url(rpc: Arc<RpcClient>, api_url: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            rpc,
        }
    }

    /// Fetch, sign and submit one trade transaction
    async fn execute(
        &self,
        credential: &Keypair,
        request: LocalTradeRequest,
    ) -> Result<TradeOutcome> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransactionBuild(format!("HTTP request failed: {}", e)))?;

        let local_response: LocalTradeResponse = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = local_response.error {
            // The collaborator rejected the trade; report rather than raise.
            return Ok(TradeOutcome::failed(error));
        }

        let tx_base64 = local_response
            .transaction
            .ok_or_else(|| Error::TransactionBuild("No transaction in response".to_string()))?;

        let tx_bytes = BASE64
            .decode(tx_base64)
            .map_err(|e| Error::Deserialization(format!("Invalid transaction encoding: {}", e)))?;

        let unsigned: VersionedTransaction = bincode::deserialize(&tx_bytes)
            .map_err(|e| Error::Deserialization(format!("Invalid transaction bytes: {}", e)))?;

        let signed = VersionedTransaction::try_new(unsigned.message, &[credential])
            .map_err(|e| Error::TransactionBuild(format!("Signing failed: {}", e)))?;

        debug!("Submitting signed trade transaction");

        match self.rpc.send_transaction(&signed).await {
            Ok(signature) => Ok(TradeOutcome::ok(signature.to_string())),
            Err(e) => Ok(TradeOutcome::failed(e.to_string())),
        }
    }
}

#[async_trait]
impl PumpClient for PumpPortalTrader {
    async fn buy(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        sol_amount: u64,
        slippage_bps: u64,
        priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome> {
        info!(%mint, sol_amount, "Executing buy");

        let request = LocalTradeRequest {
            action: TradeAction::Buy,
            mint: mint.to_string(),
            amount: sol_amount.to_string(),
            denominated_in_sol: "true".to_string(),
            slippage: slippage_bps / 100,
            priority_fee: priority_fee.total_sol(),
            public_key: credential.pubkey().to_string(),
            pool: "pump".to_string(),
        };

        self.execute(credential, request).await
    }

    async fn sell(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        token_amount: u64,
        slippage_bps: u64,
        priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome> {
        info!(%mint, token_amount, "Executing sell");

        let request = LocalTradeRequest {
            action: TradeAction::Sell,
            mint: mint.to_string(),
            amount: token_amount.to_string(),
            denominated_in_sol: "false".to_string(),
            slippage: slippage_bps / 100,
            priority_fee: priority_fee.total_sol(),
            public_key: credential.pubkey().to_string(),
            pool: "pump".to_string(),
        };

        self.execute(credential, request).await
    }
}

/// Trader used by `--dry-run`: logs the intent and reports success without
/// touching the network
#[derive(Debug, Default)]
pub struct DryRunTrader;

#[async_trait]
impl PumpClient for DryRunTrader {
    async fn buy(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        sol_amount: u64,
        _slippage_bps: u64,
        _priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome> {
        warn!(
            %mint,
            sol_amount,
            wallet = %credential.pubkey(),
            "DRY-RUN: skipping buy"
        );
        Ok(TradeOutcome {
            success: true,
            signature: None,
            error: None,
        })
    }

    async fn sell(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        token_amount: u64,
        _slippage_bps: u64,
        _priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome> {
        warn!(
            %mint,
            token_amount,
            wallet = %credential.pubkey(),
            "DRY-RUN: skipping sell"
        );
        Ok(TradeOutcome {
            success: true,
            signature: None,
            error: None,
        })
    }
}
