//! Trading module - the external trading collaborator's contract
//!
//! The core never builds or signs transactions itself; it calls [`PumpClient`]
//! and reads back a [`TradeOutcome`]. Production uses the PumpPortal adapter,
//! tests and `--dry-run` substitute their own implementations.

pub mod pumpportal_api;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

use crate::error::Result;

pub use pumpportal_api::{DryRunTrader, PumpPortalTrader};

/// Slippage tolerance applied to every execution, in basis points
pub const SLIPPAGE_BASIS_POINTS: u64 = 500;

/// Compute-budget priority fee configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFee {
    /// Compute unit limit
    pub unit_limit: u32,
    /// Price per compute unit in micro-lamports
    pub unit_price: u64,
}

/// Default priority fee, part of the observable execution contract
pub const DEFAULT_PRIORITY_FEE: PriorityFee = PriorityFee {
    unit_limit: 1000,
    unit_price: 1_000_000,
};

impl PriorityFee {
    /// Total fee in SOL (`unit_limit * unit_price` micro-lamports)
    pub fn total_sol(&self) -> f64 {
        (self.unit_limit as f64) * (self.unit_price as f64) / 1e6 / 1e9
    }
}

/// Outcome of a single execution attempt
#[derive(Debug, Clone, Default)]
pub struct TradeOutcome {
    /// Did the collaborator report success?
    pub success: bool,
    /// Transaction signature, when one was produced
    pub signature: Option<String>,
    /// Failure detail, when reported
    pub error: Option<String>,
}

impl TradeOutcome {
    pub fn ok(signature: impl Into<String>) -> Self {
        Self {
            success: true,
            signature: Some(signature.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error: Some(error.into()),
        }
    }
}

/// Contract of the external trading collaborator
///
/// Implementations own everything the core delegates: transaction
/// construction, signing and submission.
#[async_trait]
pub trait PumpClient: Send + Sync {
    /// Buy `sol_amount` lamports worth of `mint` for the credential's wallet
    async fn buy(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        sol_amount: u64,
        slippage_bps: u64,
        priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome>;

    /// Sell `token_amount` base units of `mint` from the credential's wallet
    async fn sell(
        &self,
        credential: &Keypair,
        mint: &Pubkey,
        token_amount: u64,
        slippage_bps: u64,
        priority_fee: &PriorityFee,
    ) -> Result<TradeOutcome>;
}
