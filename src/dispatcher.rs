//! Event dispatcher - the single serialized processing loop
//!
//! One consumer task drains one mpsc queue. Each event is handled to
//! completion (match, execute every triggered entry in turn, mutate the
//! store) before the next event is received, so the store needs no lock and
//! no handling sequence can interleave with another. An execution that hangs
//! stalls the loop; there is deliberately no per-call timeout.

use std::collections::HashSet;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::executor::Executor;
use crate::matcher;
use crate::orders::store::OrderStore;
use crate::orders::types::{LimitOrder, SniperTask};
use crate::stream::events::{CreateEvent, PumpEvent, TradeEvent};

/// Routes incoming events through matcher, executor and store
pub struct Dispatcher {
    store: OrderStore,
    executor: Executor,
}

impl Dispatcher {
    pub fn new(store: OrderStore, executor: Executor) -> Self {
        Self { store, executor }
    }

    /// Read access to the store, used by registration and tests
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Mutable access to the store for registration before dispatch starts
    pub fn store_mut(&mut self) -> &mut OrderStore {
        &mut self.store
    }

    /// Drain the event queue until it closes
    ///
    /// Nothing that happens while handling one event can stop the loop;
    /// lifecycle events are logged and skipped.
    pub async fn run(mut self, mut events: mpsc::Receiver<PumpEvent>) {
        info!(
            sniper_tasks = self.store.sniper_tasks().len(),
            limit_orders = self.store.limit_orders().len(),
            "Dispatcher started"
        );

        while let Some(event) = events.recv().await {
            match event {
                PumpEvent::Created(create) => {
                    debug!(mint = %create.mint, symbol = %create.symbol, "Creation event");
                    self.on_create_event(&create).await;
                }
                PumpEvent::Trade(trade) => {
                    self.on_trade_event(&trade).await;
                }
                PumpEvent::Connected => info!("Stream connected"),
                PumpEvent::Disconnected => warn!("Stream disconnected"),
            }
        }

        info!("Event queue closed, dispatcher stopping");
    }

    /// Handle a token creation event
    ///
    /// Sniper tasks are not consumed: the same task fires again on the next
    /// matching creation.
    pub async fn on_create_event(&mut self, event: &CreateEvent) {
        let triggered: Vec<SniperTask> = self
            .store
            .sniper_tasks()
            .iter()
            .filter(|task| matcher::matches_create_event(task, event))
            .cloned()
            .collect();

        if triggered.is_empty() {
            return;
        }

        info!(
            mint = %event.mint,
            symbol = %event.symbol,
            triggered = triggered.len(),
            "Creation event triggered sniper tasks"
        );

        self.executor.execute_sniper_buys(&triggered, &event.mint).await;
    }

    /// Handle a trade event
    ///
    /// Every triggered order is removed after its execution attempt,
    /// successful or not: at-most-once-attempt, no retry state.
    pub async fn on_trade_event(&mut self, event: &TradeEvent) {
        let price = matcher::implied_price(event.sol_amount, event.token_amount);

        let triggered: Vec<LimitOrder> = self
            .store
            .limit_orders()
            .iter()
            .filter(|order| matcher::matches_trade_event(order, &event.mint, price))
            .cloned()
            .collect();

        if triggered.is_empty() {
            return;
        }

        info!(
            mint = %event.mint,
            price,
            triggered = triggered.len(),
            "Trade event triggered limit orders"
        );

        self.executor.execute_orders(&triggered).await;

        let attempted: HashSet<Uuid> = triggered.iter().map(|order| order.order_id).collect();
        self.store.remove_limit_orders(&attempted);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;

    use super::*;
    use crate::error::{Error, Result};
    use crate::orders::types::TickerFilter;
    use crate::trading::{PriorityFee, PumpClient, TradeOutcome};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Buy { mint: Pubkey, amount: u64 },
        Sell { mint: Pubkey, amount: u64 },
    }

    /// Scripted collaborator: records every call, optionally failing them
    #[derive(Default)]
    struct MockClient {
        calls: Mutex<Vec<Call>>,
        report_failure: bool,
        raise_error: bool,
    }

    impl MockClient {
        fn recording() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                report_failure: true,
                ..Self::default()
            })
        }

        fn raising() -> Arc<Self> {
            Arc::new(Self {
                raise_error: true,
                ..Self::default()
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PumpClient for MockClient {
        async fn buy(
            &self,
            _credential: &Keypair,
            mint: &Pubkey,
            sol_amount: u64,
            _slippage_bps: u64,
            _priority_fee: &PriorityFee,
        ) -> Result<TradeOutcome> {
            self.calls.lock().unwrap().push(Call::Buy {
                mint: *mint,
                amount: sol_amount,
            });
            if self.raise_error {
                return Err(Error::TransactionSend("mock transport failure".into()));
            }
            if self.report_failure {
                return Ok(TradeOutcome::failed("mock rejection"));
            }
            Ok(TradeOutcome::ok("mock-signature"))
        }

        async fn sell(
            &self,
            _credential: &Keypair,
            mint: &Pubkey,
            token_amount: u64,
            _slippage_bps: u64,
            _priority_fee: &PriorityFee,
        ) -> Result<TradeOutcome> {
            self.calls.lock().unwrap().push(Call::Sell {
                mint: *mint,
                amount: token_amount,
            });
            if self.raise_error {
                return Err(Error::TransactionSend("mock transport failure".into()));
            }
            if self.report_failure {
                return Ok(TradeOutcome::failed("mock rejection"));
            }
            Ok(TradeOutcome::ok("mock-signature"))
        }
    }

    fn dispatcher(client: Arc<MockClient>) -> Dispatcher {
        Dispatcher::new(OrderStore::new(), Executor::new(client))
    }

    fn credential() -> Arc<Keypair> {
        Arc::new(Keypair::new())
    }

    fn create_event(mint: Pubkey, symbol: &str) -> CreateEvent {
        CreateEvent {
            signature: "sig".to_string(),
            slot: 1,
            mint,
            name: "Test Token".to_string(),
            symbol: symbol.to_string(),
            uri: String::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    fn trade_event(mint: Pubkey, sol_amount: u64, token_amount: u64) -> TradeEvent {
        TradeEvent {
            signature: "sig".to_string(),
            mint,
            sol_amount,
            token_amount,
            is_buy: true,
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_buy_limit_order_triggers_and_is_removed() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        // limit price 0.1 * PRICE_BASE derives (1_000_000, 10_000_000)
        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();

        // implied price 50_000_000: cost 500_000 <= 1_000_000, triggers
        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 10_000_000))
            .await;

        assert_eq!(
            client.calls(),
            vec![Call::Buy {
                mint,
                amount: 1_000_000
            }]
        );
        assert!(dispatcher.store().limit_orders().is_empty());
    }

    #[tokio::test]
    async fn test_sell_order_sends_token_amount() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 10_000_000, false, 100_000_000, credential())
            .unwrap();

        // implied price 200_000_000 > limit, sell triggers
        dispatcher
            .on_trade_event(&trade_event(mint, 2_000_000, 10_000_000))
            .await;

        assert_eq!(
            client.calls(),
            vec![Call::Sell {
                mint,
                amount: 10_000_000
            }]
        );
        assert!(dispatcher.store().limit_orders().is_empty());
    }

    #[tokio::test]
    async fn test_failed_execution_still_removes_order() {
        let client = MockClient::failing();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();

        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 10_000_000))
            .await;

        assert_eq!(client.calls().len(), 1);
        // At-most-once-attempt: no retry state, order gone despite failure.
        assert!(dispatcher.store().limit_orders().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_still_removes_order_and_batch_continues() {
        let client = MockClient::raising();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();
        dispatcher
            .store_mut()
            .add_limit_order(mint, 2_000_000, true, 100_000_000, credential())
            .unwrap();

        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 10_000_000))
            .await;

        // Both attempted despite the first raising, both removed.
        assert_eq!(client.calls().len(), 2);
        assert!(dispatcher.store().limit_orders().is_empty());
    }

    #[tokio::test]
    async fn test_non_triggered_orders_are_retained() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();
        let other_mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();
        let kept = dispatcher
            .store_mut()
            .add_limit_order(other_mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();
        // Same mint, but the limit is far below the trade price.
        let kept_too = dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 1_000, credential())
            .unwrap();

        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 10_000_000))
            .await;

        assert_eq!(client.calls().len(), 1);
        let remaining: Vec<_> = dispatcher
            .store()
            .limit_orders()
            .iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&kept));
        assert!(remaining.contains(&kept_too));
    }

    #[tokio::test]
    async fn test_no_matching_orders_is_a_noop() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 1_000, credential())
            .unwrap();

        dispatcher
            .on_trade_event(&trade_event(Pubkey::new_unique(), 500_000, 10_000_000))
            .await;

        assert!(client.calls().is_empty());
        assert_eq!(dispatcher.store().limit_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_token_amount_trade() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 10_000_000, false, 100_000_000, credential())
            .unwrap();
        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();

        // Implied price 0: the sell never fires, the buy always does.
        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 0))
            .await;

        assert_eq!(
            client.calls(),
            vec![Call::Buy {
                mint,
                amount: 1_000_000
            }]
        );
        let remaining = dispatcher.store().limit_orders();
        assert_eq!(remaining.len(), 1);
        assert!(!remaining[0].is_buy);
    }

    #[tokio::test]
    async fn test_sniper_task_fires_for_matching_symbol_only() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());

        dispatcher
            .store_mut()
            .add_sniper_task(TickerFilter::symbol("A"), credential(), 111);
        dispatcher
            .store_mut()
            .add_sniper_task(TickerFilter::symbol("B"), credential(), 222);

        let mint = Pubkey::new_unique();
        dispatcher.on_create_event(&create_event(mint, "A")).await;

        assert_eq!(client.calls(), vec![Call::Buy { mint, amount: 111 }]);
    }

    #[tokio::test]
    async fn test_sniper_task_is_not_consumed() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());

        dispatcher
            .store_mut()
            .add_sniper_task(TickerFilter::symbol("GREENZ"), credential(), 1_000_000);

        dispatcher
            .on_create_event(&create_event(Pubkey::new_unique(), "GREENZ"))
            .await;
        dispatcher
            .on_create_event(&create_event(Pubkey::new_unique(), "GREENZ"))
            .await;

        // Repeated triggering is expected behavior, not a bug.
        assert_eq!(client.calls().len(), 2);
        assert_eq!(dispatcher.store().sniper_tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_unfiltered_sniper_task_fires_on_every_creation() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());

        dispatcher
            .store_mut()
            .add_sniper_task(TickerFilter::any(), credential(), 1_000_000);

        dispatcher
            .on_create_event(&create_event(Pubkey::new_unique(), "FOO"))
            .await;
        dispatcher
            .on_create_event(&create_event(Pubkey::new_unique(), "BAR"))
            .await;

        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_triggered_orders_execute_in_registration_order() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_limit_order(mint, 1_000_000, true, 100_000_000, credential())
            .unwrap();
        dispatcher
            .store_mut()
            .add_limit_order(mint, 2_000_000, true, 100_000_000, credential())
            .unwrap();

        dispatcher
            .on_trade_event(&trade_event(mint, 500_000, 10_000_000))
            .await;

        assert_eq!(
            client.calls(),
            vec![
                Call::Buy {
                    mint,
                    amount: 1_000_000
                },
                Call::Buy {
                    mint,
                    amount: 2_000_000
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_run_drains_queue_then_stops() {
        let client = MockClient::recording();
        let mut dispatcher = dispatcher(client.clone());
        let mint = Pubkey::new_unique();

        dispatcher
            .store_mut()
            .add_sniper_task(TickerFilter::any(), credential(), 42);

        let (tx, rx) = mpsc::channel(16);
        tx.send(PumpEvent::Connected).await.unwrap();
        tx.send(PumpEvent::Created(create_event(mint, "X"))).await.unwrap();
        tx.send(PumpEvent::Disconnected).await.unwrap();
        drop(tx);

        dispatcher.run(rx).await;

        assert_eq!(client.calls(), vec![Call::Buy { mint, amount: 42 }]);
    }
}
