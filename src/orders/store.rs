//! Owned store for sniper tasks and limit orders
//!
//! The store has no interior locking: every mutation and every read happens
//! inside the dispatcher's serialized event loop, one event at a time.

use std::collections::HashSet;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::orders::types::{LimitOrder, SniperTask, TickerFilter};

/// Store for both collections of standing intents
#[derive(Default)]
pub struct OrderStore {
    sniper_tasks: Vec<SniperTask>,
    limit_orders: Vec<LimitOrder>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sniper task and return its id
    pub fn add_sniper_task(
        &mut self,
        filter: TickerFilter,
        credential: Arc<Keypair>,
        buy_amount_sol: u64,
    ) -> Uuid {
        let task = SniperTask::new(filter, credential, buy_amount_sol);
        let task_id = task.task_id;
        info!(
            %task_id,
            ticker = task.filter.ticker.as_deref().unwrap_or("*"),
            buy_amount_sol,
            "Registered sniper task"
        );
        self.sniper_tasks.push(task);
        task_id
    }

    /// Register a limit order and return its id
    ///
    /// Fails on a zero limit price or a derived amount that overflows u64.
    pub fn add_limit_order(
        &mut self,
        mint: Pubkey,
        amount: u64,
        is_buy: bool,
        limit_price: u64,
        credential: Arc<Keypair>,
    ) -> Result<Uuid> {
        let order = LimitOrder::new(mint, amount, is_buy, limit_price, credential)?;
        let order_id = order.order_id;
        info!(
            %order_id,
            %mint,
            is_buy,
            sol_amount = order.sol_amount,
            token_amount = order.token_amount,
            "Registered limit order"
        );
        self.limit_orders.push(order);
        Ok(order_id)
    }

    /// Remove the given order ids from the book
    ///
    /// Absent ids are a no-op; an id can never be removed twice because the
    /// first removal takes it out of the book.
    pub fn remove_limit_orders(&mut self, order_ids: &HashSet<Uuid>) {
        if order_ids.is_empty() {
            return;
        }
        let before = self.limit_orders.len();
        self.limit_orders
            .retain(|order| !order_ids.contains(&order.order_id));
        debug!(removed = before - self.limit_orders.len(), "Removed limit orders");
    }

    pub fn sniper_tasks(&self) -> &[SniperTask] {
        &self.sniper_tasks
    }

    pub fn limit_orders(&self) -> &[LimitOrder] {
        &self.limit_orders
    }
}
