//! Main application orchestration.
//!
//! One event loop owns the [`AutoTrader`]. Event sources (replay reader,
//! sweep ticker) run as tasks and feed a single channel, so every callback
//! is handled to completion before the next one starts.

use pairmaker_core::{ExchangeEvent, OrderCommand, Side};
use pairmaker_strategy::AutoTrader;
use pairmaker_telemetry::Metrics;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::gateway::{self, OrderGateway};
use crate::{replay, sweep};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Input to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Callback from the exchange.
    Exchange(ExchangeEvent),
    /// One sweep step requested by the ticker.
    SweepTick,
}

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: u64,
    pub commands: u64,
    pub gateway_errors: u64,
    pub position: i64,
    /// Primary fills and the lots bought and sold through them.
    pub fills: u64,
    pub bought: u64,
    pub sold: u64,
    pub hedges: u64,
    pub hedged_volume: u64,
    pub hedge_failures: u64,
}

/// Main application.
pub struct Application<G: OrderGateway> {
    config: AppConfig,
    trader: AutoTrader,
    gateway: G,
    summary: RunSummary,
}

impl<G: OrderGateway> Application<G> {
    /// Create a new application.
    pub fn new(config: AppConfig, gateway: G) -> AppResult<Self> {
        config.validate()?;
        let trader = AutoTrader::new(config.strategy.clone())?;
        info!(
            primary = %config.strategy.primary,
            secondary = %config.strategy.secondary,
            tick_size = config.strategy.tick_size,
            position_limit = config.strategy.position_limit,
            "Trader initialized"
        );

        Ok(Self {
            config,
            trader,
            gateway,
            summary: RunSummary::default(),
        })
    }

    pub fn trader(&self) -> &AutoTrader {
        &self.trader
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Run until the event source is exhausted or Ctrl-C.
    ///
    /// Resting quotes are cancelled on the way out.
    pub async fn run<R>(&mut self, events: R) -> AppResult<RunSummary>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();

        let reader_handle = tokio::spawn(replay::run_reader(events, tx.clone(), shutdown.clone()));

        let sweep_handle: Option<JoinHandle<u32>> = if self.config.sweep.enabled {
            Some(tokio::spawn(sweep::run(
                self.config.sweep.clone(),
                tx.clone(),
                shutdown.clone(),
            )))
        } else {
            None
        };

        // The loop ends once every source has dropped its sender.
        drop(tx);

        info!("Entering main event loop");
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.process(event),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        shutdown.cancel();
        info!(
            resting_quotes = self.trader.active_quote_count(),
            outstanding_bids = self.trader.registry().outstanding(Side::Buy),
            outstanding_asks = self.trader.registry().outstanding(Side::Sell),
            "Cancelling resting quotes"
        );
        let commands = self.trader.cancel_all();
        self.forward(commands);

        match reader_handle.await {
            Ok(Ok(stats)) => info!(?stats, "Replay task joined"),
            Ok(Err(e)) => warn!(error = %e, "Replay task failed"),
            Err(e) => warn!(error = %e, "Replay task panicked"),
        }
        if let Some(handle) = sweep_handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Sweep task panicked");
            }
        }

        let inventory = self.trader.inventory();
        let hedger = self.trader.hedger();
        self.summary.position = inventory.position();
        self.summary.fills = inventory.fill_count();
        self.summary.bought = inventory.bought();
        self.summary.sold = inventory.sold();
        self.summary.hedges = hedger.hedges_sent();
        self.summary.hedged_volume = hedger.hedged_volume();
        self.summary.hedge_failures = hedger.failures();
        info!(
            events = self.summary.events,
            commands = self.summary.commands,
            gateway_errors = self.summary.gateway_errors,
            position = self.summary.position,
            fills = self.summary.fills,
            bought = self.summary.bought,
            sold = self.summary.sold,
            hedges = self.summary.hedges,
            hedged_volume = self.summary.hedged_volume,
            hedge_failures = self.summary.hedge_failures,
            "Shutting down"
        );
        Ok(self.summary)
    }

    /// Handle one event to completion and forward its commands.
    pub fn process(&mut self, event: AppEvent) {
        self.summary.events += 1;

        let commands = match event {
            AppEvent::Exchange(event) => self.handle_exchange(&event),
            AppEvent::SweepTick => self.trader.sweep_tick(),
        };
        self.forward(commands);

        Metrics::position(self.trader.position());
        Metrics::theo(self.trader.theo().inner());
    }

    fn handle_exchange(&mut self, event: &ExchangeEvent) -> Vec<OrderCommand> {
        let position_before = self.trader.position();
        let failures_before = self.trader.hedger().failures();

        let commands = self.trader.handle(event);

        let delta = self.trader.position() - position_before;
        if delta > 0 {
            Metrics::fill(Side::Buy, delta.unsigned_abs());
        } else if delta < 0 {
            Metrics::fill(Side::Sell, delta.unsigned_abs());
        }
        if self.trader.hedger().failures() > failures_before {
            Metrics::hedge_failed();
        }
        if matches!(event, ExchangeEvent::Error { .. }) {
            Metrics::exchange_error();
        }

        commands
    }

    /// Send a batch of commands, then flush the gateway once.
    fn forward(&mut self, commands: Vec<OrderCommand>) {
        if commands.is_empty() {
            return;
        }
        for command in &commands {
            Metrics::order_sent(command);
            if let Err(e) = gateway::dispatch(&mut self.gateway, command) {
                self.summary.gateway_errors += 1;
                warn!(order_id = %command.id(), error = %e, "Failed to forward command");
            }
        }
        if let Err(e) = self.gateway.flush() {
            self.summary.gateway_errors += 1;
            warn!(error = %e, "Failed to flush gateway");
        }
        self.summary.commands += commands.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::gateway::MockOrderGateway;
    use pairmaker_core::{BookSnapshot, Instrument, Lifespan, OrderId, Price};

    fn book() -> AppEvent {
        AppEvent::Exchange(ExchangeEvent::OrderBookUpdate(BookSnapshot::top(
            Instrument::Future,
            1,
            (9900, 20),
            (10000, 10),
        )))
    }

    #[test]
    fn test_book_update_forwards_hits_and_quotes() {
        let mut gateway = MockOrderGateway::new();
        gateway
            .expect_insert_order()
            .withf(|_, _, _, _, lifespan| *lifespan == Lifespan::FillAndKill)
            .times(2)
            .returning(|_, _, _, _, _| Ok(()));
        gateway
            .expect_insert_order()
            .withf(|_, _, _, _, lifespan| *lifespan == Lifespan::GoodForDay)
            .times(2)
            .returning(|_, _, _, _, _| Ok(()));
        gateway.expect_flush().times(1).returning(|| Ok(()));

        let mut app = Application::new(AppConfig::default(), gateway).unwrap();
        app.process(book());
        assert_eq!(app.summary.commands, 4);
        assert_eq!(app.trader().theo(), Price(10000));
    }

    #[test]
    fn test_fill_sends_hedge() {
        let mut gateway = MockOrderGateway::new();
        gateway
            .expect_insert_order()
            .returning(|_, _, _, _, _| Ok(()));
        gateway
            .expect_send_hedge_order()
            .withf(|_, side, price, volume| {
                *side == Side::Sell && *price == Price(1) && *volume == 10
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        gateway.expect_flush().times(2).returning(|| Ok(()));

        let mut app = Application::new(AppConfig::default(), gateway).unwrap();
        app.process(book());
        app.process(AppEvent::Exchange(ExchangeEvent::OrderFilled {
            order_id: OrderId(3),
            price: Price(9700),
            volume: 10,
        }));
        assert_eq!(app.trader().position(), 10);
    }

    #[test]
    fn test_gateway_errors_are_counted() {
        let mut gateway = MockOrderGateway::new();
        gateway
            .expect_insert_order()
            .returning(|_, _, _, _, _| Err(AppError::Config("gateway down".to_string())));
        gateway.expect_flush().times(1).returning(|| Ok(()));

        let mut app = Application::new(AppConfig::default(), gateway).unwrap();
        app.process(AppEvent::SweepTick);
        assert_eq!(app.summary.commands, 2);
        assert_eq!(app.summary.gateway_errors, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.strategy.pricing_levels = 0;
        assert!(Application::new(config, MockOrderGateway::new()).is_err());
    }
}
