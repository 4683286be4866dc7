//! Order module - standing trade intents and their owned store

pub mod store;
pub mod types;

pub use store::OrderStore;
pub use types::{derive_order_amounts, LimitOrder, SniperTask, TickerFilter, PRICE_BASE};
