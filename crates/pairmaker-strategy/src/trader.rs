//! Trading state aggregate and exchange callbacks.
//!
//! [`AutoTrader`] owns every piece of mutable state (theo, position, quote
//! slots, order registry, id counter). The host delivers callbacks one at a
//! time; each returns the commands to forward to the exchange and never
//! blocks.

use pairmaker_core::{
    BookSnapshot, ExchangeEvent, Lifespan, OrderCommand, OrderId, OrderIdAllocator, Price, Side,
    TickSize, MAXIMUM_ASK, MINIMUM_BID,
};
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::error::StrategyResult;
use crate::hedger::{HedgeOutcome, Hedger};
use crate::inventory::{InventoryManager, RiskPlan};
use crate::pricing::weighted_mid;
use crate::quote_manager::{QuoteManager, QuoteSlot};
use crate::registry::{OrderRegistry, OrderRole};

/// The market-making agent.
#[derive(Debug)]
pub struct AutoTrader {
    config: StrategyConfig,
    tick: TickSize,
    /// Current reference price (zero = unknown).
    theo: Price,
    inventory: InventoryManager,
    quotes: QuoteManager,
    hedger: Hedger,
    registry: OrderRegistry,
    ids: OrderIdAllocator,
}

impl AutoTrader {
    /// Create a trader with a flat position and no orders.
    pub fn new(config: StrategyConfig) -> StrategyResult<Self> {
        config.validate()?;
        let tick = config.tick()?;

        Ok(Self {
            inventory: InventoryManager::new(&config, tick),
            quotes: QuoteManager::new(tick, config.hit_offset_ticks),
            hedger: Hedger::new(tick),
            registry: OrderRegistry::new(),
            ids: OrderIdAllocator::new(),
            theo: Price::ZERO,
            tick,
            config,
        })
    }

    /// Dispatch one exchange callback.
    pub fn handle(&mut self, event: &ExchangeEvent) -> Vec<OrderCommand> {
        match event {
            ExchangeEvent::OrderBookUpdate(book) => self.on_order_book_update(book),
            ExchangeEvent::TradeTicks(ticks) => {
                self.on_trade_ticks(ticks);
                Vec::new()
            }
            ExchangeEvent::OrderFilled {
                order_id,
                price,
                volume,
            } => self.on_order_filled(*order_id, *price, *volume),
            ExchangeEvent::OrderStatus {
                order_id,
                fill_volume,
                remaining_volume,
                fees,
            } => {
                self.on_order_status(*order_id, *fill_volume, *remaining_volume, *fees);
                Vec::new()
            }
            ExchangeEvent::HedgeFilled {
                order_id,
                price,
                volume,
            } => {
                self.on_hedge_filled(*order_id, *price, *volume);
                Vec::new()
            }
            ExchangeEvent::Error { order_id, message } => {
                self.on_error(*order_id, message);
                Vec::new()
            }
        }
    }

    /// Order book snapshot.
    ///
    /// Only the primary instrument drives quoting. Books whose best bid or
    /// best ask carries no volume are ignored and theo is left unchanged.
    pub fn on_order_book_update(&mut self, book: &BookSnapshot) -> Vec<OrderCommand> {
        debug!(
            instrument = %book.instrument,
            sequence = book.sequence_number,
            best_bid = book.bid_prices[0],
            bid_volume = book.bid_volumes[0],
            best_ask = book.ask_prices[0],
            ask_volume = book.ask_volumes[0],
            "Order book received"
        );

        if !book.has_top_volume() {
            debug!(state = %book.state(), "Skipping book without top-level volume");
            return Vec::new();
        }
        if book.instrument != self.config.primary {
            return Vec::new();
        }

        self.theo = weighted_mid(book, self.tick, self.config.pricing_levels);
        let plan: RiskPlan = self.inventory.plan();
        info!(
            theo = %self.theo,
            position = self.inventory.position(),
            bid_volume = plan.bid_volume,
            ask_volume = plan.ask_volume,
            "Theo updated"
        );

        let mut commands = Vec::new();
        if self.config.hit_enabled {
            commands.extend(self.quotes.place_hits(
                self.theo,
                &plan,
                &mut self.registry,
                &mut self.ids,
            ));
        }
        commands.extend(self.quotes.reconcile(
            self.theo,
            book,
            &plan,
            &mut self.registry,
            &mut self.ids,
        ));
        commands
    }

    /// Aggregated trade ticks. Informational only.
    pub fn on_trade_ticks(&mut self, ticks: &BookSnapshot) {
        debug!(
            instrument = %ticks.instrument,
            sequence = ticks.sequence_number,
            ask_price = ticks.ask_prices[0],
            ask_volume = ticks.ask_volumes[0],
            bid_price = ticks.bid_prices[0],
            bid_volume = ticks.bid_volumes[0],
            "Trade ticks received"
        );
    }

    /// One of our primary orders traded.
    ///
    /// Classified fills move the position and are hedged within this call.
    pub fn on_order_filled(
        &mut self,
        id: OrderId,
        price: Price,
        volume: u64,
    ) -> Vec<OrderCommand> {
        info!(order_id = %id, price = %price, volume, "Order filled");

        let side = match self.registry.get(id) {
            Some(role) if role.is_primary() => role.side(),
            Some(role) => {
                warn!(order_id = %id, ?role, "Primary fill reported for a hedge order");
                return Vec::new();
            }
            None => {
                warn!(order_id = %id, "Fill for an unknown order");
                return Vec::new();
            }
        };
        if volume == 0 {
            return Vec::new();
        }

        let position = self.inventory.record_fill(side, volume);
        info!(order_id = %id, side = %side, volume, position, "Position updated");

        vec![self
            .hedger
            .hedge(side, volume, &mut self.registry, &mut self.ids)]
    }

    /// Status change of a primary order.
    pub fn on_order_status(
        &mut self,
        id: OrderId,
        fill_volume: u64,
        remaining_volume: u64,
        fees: i64,
    ) {
        debug!(
            order_id = %id,
            fill_volume,
            remaining_volume,
            fees,
            "Order status received"
        );
        if remaining_volume != 0 {
            return;
        }

        let cleared = self.quotes.on_order_terminal(id);
        let role = self.registry.remove(id);
        debug!(order_id = %id, ?cleared, ?role, "Order terminal");
    }

    /// Result of a hedge order.
    pub fn on_hedge_filled(&mut self, id: OrderId, price: Price, volume: u64) -> HedgeOutcome {
        self.hedger
            .on_hedge_filled(id, price, volume, &mut self.registry)
    }

    /// Exchange-detected error.
    ///
    /// Order-specific errors terminate the order; others are only logged.
    pub fn on_error(&mut self, id: OrderId, message: &str) {
        warn!(order_id = %id, error = message, "Exchange error");
        if !id.is_none() {
            self.on_order_status(id, 0, 0, 0);
        }
    }

    /// Cancel both resting quotes.
    pub fn cancel_all(&mut self) -> Vec<OrderCommand> {
        self.quotes.cancel_all()
    }

    /// One step of a sweep: cancel any resting quote, then send a one-lot
    /// fill-and-kill order on each side at the exchange's extreme prices.
    pub fn sweep_tick(&mut self) -> Vec<OrderCommand> {
        let mut commands = self.quotes.cancel_all();
        if !commands.is_empty() {
            info!(cancelled = commands.len(), "Sweep pulled resting quotes");
        }

        for (side, price) in [
            (Side::Sell, MINIMUM_BID),
            (Side::Buy, MAXIMUM_ASK.floor_to_tick(self.tick)),
        ] {
            let id = self.ids.next_id();
            self.registry.register(id, OrderRole::Hit(side));
            debug!(order_id = %id, side = %side, price = %price, "Sweep order");
            commands.push(OrderCommand::Insert {
                id,
                side,
                price,
                volume: 1,
                lifespan: Lifespan::FillAndKill,
            });
        }
        commands
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn theo(&self) -> Price {
        self.theo
    }

    pub fn position(&self) -> i64 {
        self.inventory.position()
    }

    pub fn resting(&self, side: Side) -> Option<&QuoteSlot> {
        self.quotes.resting(side)
    }

    /// Number of sides with a resting quote (0..=2).
    pub fn active_quote_count(&self) -> usize {
        self.quotes.active_quote_count()
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn inventory(&self) -> &InventoryManager {
        &self.inventory
    }

    pub fn hedger(&self) -> &Hedger {
        &self.hedger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmaker_core::Instrument;

    fn trader() -> AutoTrader {
        AutoTrader::new(StrategyConfig::default()).unwrap()
    }

    fn book(seq: u64) -> BookSnapshot {
        BookSnapshot::top(Instrument::Future, seq, (9900, 20), (10000, 10))
    }

    fn inserts(commands: &[OrderCommand]) -> Vec<(Side, u64, u64, Lifespan)> {
        commands
            .iter()
            .filter_map(|c| match c {
                OrderCommand::Insert {
                    side,
                    price,
                    volume,
                    lifespan,
                    ..
                } => Some((*side, price.inner(), *volume, *lifespan)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StrategyConfig {
            tick_size: 0,
            ..StrategyConfig::default()
        };
        assert!(AutoTrader::new(config).is_err());
    }

    #[test]
    fn test_first_book_hits_then_quotes() {
        let mut trader = trader();
        let commands = trader.on_order_book_update(&book(1));

        assert_eq!(trader.theo(), Price(10000));
        assert_eq!(
            inserts(&commands),
            vec![
                (Side::Sell, 10400, 60, Lifespan::FillAndKill),
                (Side::Buy, 9600, 60, Lifespan::FillAndKill),
                (Side::Buy, 9700, 40, Lifespan::GoodForDay),
                (Side::Sell, 10300, 40, Lifespan::GoodForDay),
            ]
        );
        assert_eq!(trader.resting(Side::Buy).unwrap().id, OrderId(3));
        assert_eq!(trader.resting(Side::Sell).unwrap().id, OrderId(4));
        assert_eq!(trader.registry().len(), 4);
    }

    #[test]
    fn test_hits_disabled() {
        let config = StrategyConfig {
            hit_enabled: false,
            ..StrategyConfig::default()
        };
        let mut trader = AutoTrader::new(config).unwrap();
        let commands = trader.on_order_book_update(&book(1));
        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|c| matches!(c, OrderCommand::Insert { lifespan: Lifespan::GoodForDay, .. })));
    }

    #[test]
    fn test_secondary_book_ignored() {
        let mut trader = trader();
        let etf = BookSnapshot::top(Instrument::Etf, 1, (9900, 20), (10000, 10));
        assert!(trader.on_order_book_update(&etf).is_empty());
        assert_eq!(trader.theo(), Price::ZERO);
    }

    #[test]
    fn test_book_without_top_volume_keeps_theo() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        let thin = BookSnapshot::top(Instrument::Future, 2, (9500, 0), (9600, 10));
        assert!(trader.on_order_book_update(&thin).is_empty());
        assert_eq!(trader.theo(), Price(10000));
    }

    #[test]
    fn test_bid_fill_is_hedged_with_sell() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        let commands = trader.on_order_filled(OrderId(3), Price(9700), 10);
        assert_eq!(trader.position(), 10);
        assert_eq!(
            commands,
            vec![OrderCommand::Hedge {
                id: OrderId(5),
                side: Side::Sell,
                price: MINIMUM_BID,
                volume: 10,
            }]
        );
        assert_eq!(
            trader.registry().get(OrderId(5)),
            Some(OrderRole::Hedge(Side::Sell))
        );
    }

    #[test]
    fn test_ask_fill_is_hedged_with_buy_at_max() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        let commands = trader.on_order_filled(OrderId(4), Price(10300), 15);
        assert_eq!(trader.position(), -15);
        match &commands[..] {
            [OrderCommand::Hedge {
                side, price, volume, ..
            }] => {
                assert_eq!(*side, Side::Buy);
                assert_eq!(*price, Price(2_147_483_600));
                assert_eq!(*volume, 15);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_and_empty_fills_ignored() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        assert!(trader.on_order_filled(OrderId(99), Price(9700), 10).is_empty());
        assert!(trader.on_order_filled(OrderId(3), Price(9700), 0).is_empty());
        assert_eq!(trader.position(), 0);
        assert_eq!(trader.hedger().hedges_sent(), 0);
    }

    #[test]
    fn test_position_tracks_signed_fill_sum() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        trader.on_order_filled(OrderId(3), Price(9700), 10);
        trader.on_order_filled(OrderId(4), Price(10300), 25);
        trader.on_order_filled(OrderId(3), Price(9700), 5);
        assert_eq!(trader.position(), 10 - 25 + 5);
        assert_eq!(trader.inventory().bought(), 15);
        assert_eq!(trader.inventory().sold(), 25);
    }

    #[test]
    fn test_hedge_fill_does_not_move_position() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));
        trader.on_order_filled(OrderId(3), Price(9700), 10);

        // Hedge result arriving on the primary fill path is not a position change.
        assert!(trader.on_order_filled(OrderId(5), Price(9650), 10).is_empty());
        let outcome = trader.on_hedge_filled(OrderId(5), Price(9650), 10);
        assert_eq!(
            outcome,
            HedgeOutcome::Filled {
                price: Price(9650),
                volume: 10
            }
        );
        assert_eq!(trader.position(), 10);
        assert!(!trader.registry().contains(OrderId(5)));
    }

    #[test]
    fn test_terminal_status_clears_slot_and_registry() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        trader.on_order_status(OrderId(3), 10, 30, 0);
        assert!(trader.resting(Side::Buy).is_some());

        trader.on_order_status(OrderId(3), 10, 0, 0);
        assert!(trader.resting(Side::Buy).is_none());
        assert!(!trader.registry().contains(OrderId(3)));
        assert!(trader.resting(Side::Sell).is_some());
    }

    #[test]
    fn test_skewed_requote_at_position_70() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));
        trader.on_order_filled(OrderId(2), Price(9600), 60);
        trader.on_order_filled(OrderId(3), Price(9700), 10);
        assert_eq!(trader.position(), 70);

        let commands = trader.on_order_book_update(&book(2));
        assert_eq!(
            commands,
            vec![
                OrderCommand::Insert {
                    id: OrderId(7),
                    side: Side::Sell,
                    price: Price(10400),
                    volume: 120,
                    lifespan: Lifespan::FillAndKill,
                },
                OrderCommand::Cancel { id: OrderId(3) },
                OrderCommand::Cancel { id: OrderId(4) },
                OrderCommand::Insert {
                    id: OrderId(8),
                    side: Side::Buy,
                    price: Price(9600),
                    volume: 30,
                    lifespan: Lifespan::GoodForDay,
                },
                OrderCommand::Insert {
                    id: OrderId(9),
                    side: Side::Sell,
                    price: Price(10200),
                    volume: 50,
                    lifespan: Lifespan::GoodForDay,
                },
            ]
        );
    }

    #[test]
    fn test_order_error_terminates_order() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        trader.on_error(OrderId(4), "order rejected");
        assert!(trader.resting(Side::Sell).is_none());
        assert!(!trader.registry().contains(OrderId(4)));

        trader.on_error(OrderId::NONE, "rate limited");
        assert!(trader.resting(Side::Buy).is_some());
    }

    #[test]
    fn test_handle_dispatches_events() {
        let mut trader = trader();
        let commands = trader.handle(&ExchangeEvent::OrderBookUpdate(book(1)));
        assert_eq!(commands.len(), 4);

        let commands = trader.handle(&ExchangeEvent::OrderFilled {
            order_id: OrderId(3),
            price: Price(9700),
            volume: 10,
        });
        assert_eq!(commands.len(), 1);

        let commands = trader.handle(&ExchangeEvent::HedgeFilled {
            order_id: OrderId(5),
            price: Price::ZERO,
            volume: 0,
        });
        assert!(commands.is_empty());
        assert_eq!(trader.hedger().failures(), 1);
    }

    #[test]
    fn test_sweep_tick_crosses_both_sides() {
        let mut trader = trader();
        let commands = trader.sweep_tick();
        assert_eq!(
            inserts(&commands),
            vec![
                (Side::Sell, 1, 1, Lifespan::FillAndKill),
                (Side::Buy, 2_147_483_600, 1, Lifespan::FillAndKill),
            ]
        );
        assert_eq!(trader.registry().len(), 2);
    }

    #[test]
    fn test_sweep_cancels_resting_quotes_first() {
        let config = StrategyConfig {
            hit_enabled: false,
            ..StrategyConfig::default()
        };
        let mut trader = AutoTrader::new(config).unwrap();
        trader.on_order_book_update(&book(1));
        assert_eq!(trader.active_quote_count(), 2);

        let commands = trader.sweep_tick();
        assert_eq!(
            commands[..2],
            [
                OrderCommand::Cancel { id: OrderId(1) },
                OrderCommand::Cancel { id: OrderId(2) },
            ]
        );
        assert_eq!(
            inserts(&commands),
            vec![
                (Side::Sell, 1, 1, Lifespan::FillAndKill),
                (Side::Buy, 2_147_483_600, 1, Lifespan::FillAndKill),
            ]
        );
        assert_eq!(trader.active_quote_count(), 0);

        // Nothing left to pull on the next step.
        assert_eq!(trader.sweep_tick().len(), 2);
    }

    #[test]
    fn test_fill_on_cancel_pending_quote_is_hedged() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));

        // Theo moves to 10200: both quotes are cancelled and replaced.
        let moved = BookSnapshot::top(Instrument::Future, 2, (10100, 20), (10200, 10));
        let commands = trader.on_order_book_update(&moved);
        assert!(commands.contains(&OrderCommand::Cancel { id: OrderId(3) }));
        assert_ne!(trader.resting(Side::Buy).unwrap().id, OrderId(3));

        // The cancelled bid trades before its terminal status arrives.
        let commands = trader.on_order_filled(OrderId(3), Price(9700), 10);
        assert_eq!(trader.position(), 10);
        assert_eq!(commands.len(), 1);
        assert!(matches!(
            commands[0],
            OrderCommand::Hedge {
                side: Side::Sell,
                volume: 10,
                ..
            }
        ));
        assert_eq!(trader.hedger().hedges_sent(), 1);

        trader.on_order_status(OrderId(3), 10, 0, 0);
        assert!(!trader.registry().contains(OrderId(3)));
        assert!(trader.resting(Side::Buy).is_some());
    }

    #[test]
    fn test_cancel_all_pulls_resting_quotes() {
        let mut trader = trader();
        trader.on_order_book_update(&book(1));
        let commands = trader.cancel_all();
        assert_eq!(
            commands,
            vec![
                OrderCommand::Cancel { id: OrderId(3) },
                OrderCommand::Cancel { id: OrderId(4) },
            ]
        );
        assert!(trader.resting(Side::Buy).is_none());
    }
}
