//! Decoded pump.fun events consumed by the dispatcher

use solana_sdk::pubkey::Pubkey;

/// Event delivered on the dispatcher queue
#[derive(Debug, Clone)]
pub enum PumpEvent {
    /// New token created
    Created(CreateEvent),
    /// Trade occurred (buy or sell)
    Trade(TradeEvent),
    /// Connected to the stream
    Connected,
    /// Disconnected from the stream
    Disconnected,
}

/// Token creation event
#[derive(Debug, Clone)]
pub struct CreateEvent {
    /// Transaction signature
    pub signature: String,
    /// Slot number (0 when the source does not provide it)
    pub slot: u64,
    /// Token mint address
    pub mint: Pubkey,
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Metadata URI
    pub uri: String,
    /// Timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Token trade event (buy or sell)
#[derive(Debug, Clone)]
pub struct TradeEvent {
    /// Transaction signature
    pub signature: String,
    /// Token mint address
    pub mint: Pubkey,
    /// SOL amount traded in lamports
    pub sol_amount: u64,
    /// Token amount traded in base units
    pub token_amount: u64,
    /// Is this a buy (true) or sell (false)
    pub is_buy: bool,
    /// Timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
