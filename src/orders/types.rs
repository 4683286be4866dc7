//! Standing trade intents: sniper tasks and limit orders
//!
//! Amount derivation is fixed-point integer arithmetic on lamport/token base
//! units. Prices are SOL-per-token scaled by [`PRICE_BASE`]; every division
//! truncates toward zero.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Fixed-point scale for prices (SOL lamports per whole token unit)
pub const PRICE_BASE: u64 = 1_000_000_000;

/// Ticker filter for sniper tasks
///
/// An unset ticker matches every creation event. Comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerFilter {
    pub ticker: Option<String>,
}

impl TickerFilter {
    /// Filter that matches every creation event
    pub fn any() -> Self {
        Self { ticker: None }
    }

    /// Filter that matches only the given symbol
    pub fn symbol(ticker: impl Into<String>) -> Self {
        Self {
            ticker: Some(ticker.into()),
        }
    }
}

/// A standing intent to buy a fixed SOL amount of any token whose creation
/// event passes the ticker filter
///
/// Tasks are never consumed: every matching creation event re-triggers a buy.
#[derive(Clone)]
pub struct SniperTask {
    /// Unique task identifier
    pub task_id: Uuid,
    /// Ticker filter (unset = match all)
    pub filter: TickerFilter,
    /// Signing credential for the buy
    pub credential: Arc<Keypair>,
    /// Buy amount in lamports
    pub buy_amount_sol: u64,
}

impl SniperTask {
    pub fn new(filter: TickerFilter, credential: Arc<Keypair>, buy_amount_sol: u64) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            filter,
            credential,
            buy_amount_sol,
        }
    }
}

impl std::fmt::Debug for SniperTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SniperTask")
            .field("task_id", &self.task_id)
            .field("filter", &self.filter)
            .field("buy_amount_sol", &self.buy_amount_sol)
            .finish()
    }
}

/// A standing intent to buy or sell a fixed quantity once price crosses a
/// limit
///
/// Both derived amounts are fixed at creation time; the order is removed from
/// the store after its first execution attempt, successful or not.
#[derive(Clone)]
pub struct LimitOrder {
    /// Unique order identifier
    pub order_id: Uuid,
    /// Token mint address
    pub mint: Pubkey,
    /// Buy (true) or sell (false)
    pub is_buy: bool,
    /// SOL side of the order in lamports
    pub sol_amount: u64,
    /// Token side of the order in base units
    pub token_amount: u64,
    /// Signing credential for the execution
    pub credential: Arc<Keypair>,
}

impl LimitOrder {
    /// Create an order, deriving both amounts from the user-specified
    /// quantity, direction and limit price
    pub fn new(
        mint: Pubkey,
        amount: u64,
        is_buy: bool,
        limit_price: u64,
        credential: Arc<Keypair>,
    ) -> Result<Self> {
        let (sol_amount, token_amount) = derive_order_amounts(amount, is_buy, limit_price)?;
        Ok(Self {
            order_id: Uuid::new_v4(),
            mint,
            is_buy,
            sol_amount,
            token_amount,
            credential,
        })
    }
}

impl std::fmt::Debug for LimitOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitOrder")
            .field("order_id", &self.order_id)
            .field("mint", &self.mint)
            .field("is_buy", &self.is_buy)
            .field("sol_amount", &self.sol_amount)
            .field("token_amount", &self.token_amount)
            .finish()
    }
}

/// Derive the `(sol_amount, token_amount)` pair for a limit order
///
/// For a buy, `amount` is lamports to spend; for a sell, `amount` is token
/// units to sell. The other side is derived from the limit price:
///
/// ```text
/// sol_amount   = is_buy ? amount : amount * limit_price / PRICE_BASE
/// token_amount = is_buy ? amount * PRICE_BASE / limit_price : amount
/// ```
///
/// A zero limit price is a registration error, as is a derived amount that
/// does not fit in u64.
pub fn derive_order_amounts(amount: u64, is_buy: bool, limit_price: u64) -> Result<(u64, u64)> {
    if limit_price == 0 {
        return Err(Error::ZeroLimitPrice);
    }

    let sol_amount = if is_buy {
        amount
    } else {
        mul_div(amount, limit_price, PRICE_BASE).ok_or(Error::AmountOverflow {
            amount,
            limit_price,
        })?
    };
    let token_amount = if is_buy {
        mul_div(amount, PRICE_BASE, limit_price).ok_or(Error::AmountOverflow {
            amount,
            limit_price,
        })?
    } else {
        amount
    };

    Ok((sol_amount, token_amount))
}

/// `a * b / d` with a u128 intermediate, truncating toward zero
///
/// Returns None when the quotient does not fit in u64. `d` must be non-zero.
pub(crate) fn mul_div(a: u64, b: u64, d: u64) -> Option<u64> {
    let q = (a as u128) * (b as u128) / (d as u128);
    u64::try_from(q).ok()
}
