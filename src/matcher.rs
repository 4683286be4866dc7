//! Pure matching logic for sniper tasks and limit orders
//!
//! No side effects and no store mutation here: the dispatcher computes the
//! implied price once per trade event and filters the store's collections
//! through these predicates.

use solana_sdk::pubkey::Pubkey;

use crate::orders::types::{LimitOrder, SniperTask, PRICE_BASE};
use crate::stream::events::CreateEvent;

/// Implied price of a trade, in lamports per token scaled by [`PRICE_BASE`]
///
/// A zero token amount yields price 0 rather than dividing by zero; the
/// match predicates below keep the degenerate behavior that follows from
/// that (sells never fire on a zero price, buys on the same mint always do).
pub fn implied_price(sol_amount: u64, token_amount: u64) -> u64 {
    if token_amount == 0 {
        return 0;
    }
    // Widen to u128 for the product; a quotient past u64 saturates.
    let q = (sol_amount as u128) * (PRICE_BASE as u128) / (token_amount as u128);
    u64::try_from(q).unwrap_or(u64::MAX)
}

/// Does a creation event trigger this sniper task?
///
/// True when the filter is unset or its ticker equals the event symbol
/// exactly (case-sensitive).
pub fn matches_create_event(task: &SniperTask, event: &CreateEvent) -> bool {
    match &task.filter.ticker {
        None => true,
        Some(ticker) => ticker == &event.symbol,
    }
}

/// Does a trade at `price` on `mint` trigger this limit order?
///
/// Buy orders fire when the order's SOL side covers the current cost of its
/// token side (price has fallen to or below the limit); sell orders fire
/// when the current value strictly exceeds the SOL side (price has risen
/// above the limit).
pub fn matches_trade_event(order: &LimitOrder, mint: &Pubkey, price: u64) -> bool {
    if &order.mint != mint {
        return false;
    }
    let cost = (order.token_amount as u128) * (price as u128) / (PRICE_BASE as u128);
    if order.is_buy {
        order.sol_amount as u128 >= cost
    } else {
        (order.sol_amount as u128) < cost
    }
}
