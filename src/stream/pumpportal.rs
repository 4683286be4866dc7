//! PumpPortal WebSocket client
//!
//! PumpPortal provides a free WebSocket API for real-time pump.fun data.
//! The client subscribes to new-token and token-trade feeds and forwards
//! decoded events into the dispatcher's queue.
//!
//! WebSocket endpoint: wss://pumpportal.fun/api/data
//! Documentation: https://pumpportal.fun/data-api/real-time

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::stream::events::{CreateEvent, PumpEvent, TradeEvent};

/// PumpPortal WebSocket URL
pub const PUMPPORTAL_WS_URL: &str = "wss://pumpportal.fun/api/data";

/// Subscription methods
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMessage {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

impl SubscriptionMessage {
    /// Subscribe to new token creation events
    pub fn subscribe_new_tokens() -> Self {
        Self {
            method: "subscribeNewToken".to_string(),
            keys: None,
        }
    }

    /// Subscribe to trades on specific tokens
    pub fn subscribe_token_trades(mints: Vec<String>) -> Self {
        Self {
            method: "subscribeTokenTrade".to_string(),
            keys: Some(mints),
        }
    }
}

/// New token message on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTokenMessage {
    pub signature: String,
    pub mint: String,
    pub tx_type: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Trade message on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeMessage {
    pub signature: String,
    pub mint: String,
    pub tx_type: String, // "buy" or "sell"
    pub token_amount: u64,
    pub sol_amount: u64,
}

/// Configuration for the stream client
#[derive(Debug, Clone)]
pub struct PumpStreamConfig {
    /// WebSocket URL (default: wss://pumpportal.fun/api/data)
    pub ws_url: String,
    /// Reconnect delay in milliseconds
    pub reconnect_delay_ms: u64,
    /// Maximum reconnect attempts (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Ping interval in seconds
    pub ping_interval_secs: u64,
}

impl Default for PumpStreamConfig {
    fn default() -> Self {
        Self {
            ws_url: PUMPPORTAL_WS_URL.to_string(),
            reconnect_delay_ms: 1000,
            max_reconnect_attempts: 0, // Infinite
            ping_interval_secs: 30,
        }
    }
}

/// WebSocket client feeding the dispatcher queue
pub struct PumpStreamClient {
    config: PumpStreamConfig,
    event_tx: mpsc::Sender<PumpEvent>,
    shutdown: tokio::sync::broadcast::Sender<()>,
}

impl PumpStreamClient {
    pub fn new(config: PumpStreamConfig, event_tx: mpsc::Sender<PumpEvent>) -> Self {
        let (shutdown, _) = tokio::sync::broadcast::channel(1);

        Self {
            config,
            event_tx,
            shutdown,
        }
    }

    /// Start the WebSocket connection
    ///
    /// `trade_mints` selects the token-trade feeds to follow; creation events
    /// arrive for every new token when `subscribe_new_tokens` is set.
    pub async fn start(&self, subscribe_new_tokens: bool, trade_mints: Vec<String>) -> Result<()> {
        info!("Starting PumpPortal WebSocket client...");
        info!("URL: {}", self.config.ws_url);

        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        let mut shutdown_rx = self.shutdown.subscribe();

        tokio::spawn(async move {
            let mut reconnect_attempts = 0u32;

            loop {
                // Check for shutdown
                if shutdown_rx.try_recv().is_ok() {
                    info!("Stream client shutting down");
                    break;
                }

                match Self::connect_and_stream(&config, &event_tx, subscribe_new_tokens, &trade_mints)
                    .await
                {
                    Ok(_) => {
                        // Clean disconnect
                        reconnect_attempts = 0;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        reconnect_attempts += 1;

                        if config.max_reconnect_attempts > 0
                            && reconnect_attempts >= config.max_reconnect_attempts
                        {
                            error!(
                                "Max reconnect attempts ({}) reached",
                                config.max_reconnect_attempts
                            );
                            break;
                        }
                    }
                }

                let _ = event_tx.send(PumpEvent::Disconnected).await;

                // Wait before reconnecting
                let delay = Duration::from_millis(config.reconnect_delay_ms);
                warn!("Reconnecting in {:?}...", delay);
                sleep(delay).await;
            }
        });

        Ok(())
    }

    /// Stop the client
    pub fn stop(&self) {
        let _ = self.shutdown.send(());
    }

    /// Connect and stream events until the connection drops
    async fn connect_and_stream(
        config: &PumpStreamConfig,
        event_tx: &mpsc::Sender<PumpEvent>,
        subscribe_new_tokens: bool,
        trade_mints: &[String],
    ) -> Result<()> {
        info!("Connecting to PumpPortal WebSocket...");

        let url = url::Url::parse(&config.ws_url)
            .map_err(|e| Error::Config(format!("Invalid WebSocket URL: {}", e)))?;

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::StreamConnection(format!("WebSocket connect failed: {}", e)))?;

        info!("Connected to PumpPortal WebSocket");

        event_tx
            .send(PumpEvent::Connected)
            .await
            .map_err(|e| Error::Internal(format!("Failed to send event: {}", e)))?;

        let (mut write, mut read) = ws_stream.split();

        if subscribe_new_tokens {
            let msg = SubscriptionMessage::subscribe_new_tokens();
            let json = serde_json::to_string(&msg)?;
            write
                .send(Message::Text(json))
                .await
                .map_err(|e| Error::StreamConnection(format!("Failed to subscribe: {}", e)))?;
            info!("Subscribed to new token events");
        }

        if !trade_mints.is_empty() {
            let msg = SubscriptionMessage::subscribe_token_trades(trade_mints.to_vec());
            let json = serde_json::to_string(&msg)?;
            write
                .send(Message::Text(json))
                .await
                .map_err(|e| Error::StreamConnection(format!("Failed to subscribe: {}", e)))?;
            info!("Subscribed to trade events for {} mint(s)", trade_mints.len());
        }

        let ping_interval = Duration::from_secs(config.ping_interval_secs);
        let mut ping_timer = tokio::time::interval(ping_interval);

        loop {
            tokio::select! {
                // Ping to keep connection alive
                _ = ping_timer.tick() => {
                    if let Err(e) = write.send(Message::Ping(vec![])).await {
                        error!("Failed to send ping: {}", e);
                        break;
                    }
                    debug!("Sent ping");
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = Self::handle_message(&text, event_tx).await {
                                warn!("Failed to handle message: {}", e);
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            debug!("Received pong");
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("WebSocket closed by server");
                            break;
                        }
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            break;
                        }
                        None => {
                            info!("WebSocket stream ended");
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Handle one incoming WebSocket message
    async fn handle_message(text: &str, event_tx: &mpsc::Sender<PumpEvent>) -> Result<()> {
        // Try parsing as a new token message
        if let Ok(token_message) = serde_json::from_str::<NewTokenMessage>(text) {
            if token_message.tx_type == "create" {
                debug!(
                    "New token: {} ({}) - {}",
                    token_message.name, token_message.symbol, token_message.mint
                );
                event_tx
                    .send(PumpEvent::Created(token_message.into()))
                    .await
                    .map_err(|e| Error::Internal(e.to_string()))?;
                return Ok(());
            }
        }

        // Try parsing as a trade message
        if let Ok(trade_message) = serde_json::from_str::<TradeMessage>(text) {
            debug!(
                "Trade: {} {} {} tokens for {} lamports",
                trade_message.tx_type,
                trade_message.token_amount,
                trade_message.mint,
                trade_message.sol_amount
            );
            event_tx
                .send(PumpEvent::Trade(trade_message.into()))
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
            return Ok(());
        }

        // Unknown message format
        debug!("Unknown message: {}", &text[..text.len().min(100)]);
        Ok(())
    }
}

impl From<NewTokenMessage> for CreateEvent {
    fn from(message: NewTokenMessage) -> Self {
        Self {
            signature: message.signature,
            slot: 0, // Not provided by PumpPortal
            mint: Pubkey::from_str(&message.mint).unwrap_or_default(),
            name: message.name,
            symbol: message.symbol,
            uri: message.uri,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl From<TradeMessage> for TradeEvent {
    fn from(message: TradeMessage) -> Self {
        Self {
            signature: message.signature,
            mint: Pubkey::from_str(&message.mint).unwrap_or_default(),
            sol_amount: message.sol_amount,
            token_amount: message.token_amount,
            is_buy: message.tx_type == "buy",
            timestamp: chrono::Utc::now(),
        }
    }
}
