//! Execution of triggered intents against the trading collaborator
//!
//! Strictly sequential: one order or task at a time, each awaited to
//! completion. A failed execution is logged and the batch continues; nothing
//! here retries or rolls back.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::orders::types::{LimitOrder, SniperTask};
use crate::trading::{PumpClient, DEFAULT_PRIORITY_FEE, SLIPPAGE_BASIS_POINTS};

/// Executes triggered limit orders and sniper buys
pub struct Executor {
    client: Arc<dyn PumpClient>,
}

impl Executor {
    pub fn new(client: Arc<dyn PumpClient>) -> Self {
        Self { client }
    }

    /// Execute a batch of triggered limit orders, one at a time
    ///
    /// Buy orders spend their SOL side, sell orders move their token side.
    /// Each outcome is reported; a failure never blocks the rest of the batch.
    pub async fn execute_orders(&self, orders: &[LimitOrder]) {
        for order in orders {
            let result = if order.is_buy {
                self.client
                    .buy(
                        &order.credential,
                        &order.mint,
                        order.sol_amount,
                        SLIPPAGE_BASIS_POINTS,
                        &DEFAULT_PRIORITY_FEE,
                    )
                    .await
            } else {
                self.client
                    .sell(
                        &order.credential,
                        &order.mint,
                        order.token_amount,
                        SLIPPAGE_BASIS_POINTS,
                        &DEFAULT_PRIORITY_FEE,
                    )
                    .await
            };

            match result {
                Ok(outcome) if outcome.success => {
                    info!(order_id = %order.order_id, signature = ?outcome.signature, "Execute success");
                }
                Ok(outcome) => {
                    warn!(
                        order_id = %order.order_id,
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "Execute failed"
                    );
                }
                Err(e) => {
                    warn!(order_id = %order.order_id, error = %e, "Execute failed");
                }
            }
        }
    }

    /// Execute a sniper buy for each triggered task, one at a time
    pub async fn execute_sniper_buys(&self, tasks: &[SniperTask], mint: &Pubkey) {
        for task in tasks {
            let result = self
                .client
                .buy(
                    &task.credential,
                    mint,
                    task.buy_amount_sol,
                    SLIPPAGE_BASIS_POINTS,
                    &DEFAULT_PRIORITY_FEE,
                )
                .await;

            match result {
                Ok(outcome) if outcome.success => {
                    info!(task_id = %task.task_id, %mint, signature = ?outcome.signature, "Buy success");
                }
                Ok(outcome) => {
                    warn!(
                        task_id = %task.task_id,
                        %mint,
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "Buy failed"
                    );
                }
                Err(e) => {
                    warn!(task_id = %task.task_id, %mint, error = %e, "Buy failed");
                }
            }
        }
    }
}
