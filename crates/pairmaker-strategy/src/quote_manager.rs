//! Quote lifecycle management.
//!
//! Owns the at-most-one-bid / at-most-one-ask resting order state:
//! - Place a quote when a side is empty and risk allows it
//! - Cancel a quote when its price is stale or the position limit is near
//! - Clear a side when the exchange reports the order terminal
//! - Send fill-and-kill hit orders ahead of quote reconciliation
//!
//! A side moves ABSENT → RESTING on insert and back to ABSENT either when a
//! cancel is *sent* or when the order terminates. A cancelled order stays in
//! the [`OrderRegistry`] until its terminal status arrives, so fills racing
//! the cancel are still classified.

use pairmaker_core::{
    BookSnapshot, Lifespan, OrderCommand, OrderId, OrderIdAllocator, Price, Side, TickSize,
};
use tracing::{debug, info};

use crate::inventory::RiskPlan;
use crate::registry::{OrderRegistry, OrderRole};

/// A resting quote tracked by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSlot {
    /// Client order id.
    pub id: OrderId,
    /// Quoted price.
    pub price: Price,
    /// Quoted volume in lots.
    pub volume: u64,
}

/// Manages the resting bid and ask on the primary instrument.
#[derive(Debug)]
pub struct QuoteManager {
    bid: Option<QuoteSlot>,
    ask: Option<QuoteSlot>,
    /// Distance of hit orders from theo.
    hit_offset: Price,
}

impl QuoteManager {
    /// Create a manager with both sides absent.
    pub fn new(tick: TickSize, hit_offset_ticks: u64) -> Self {
        Self {
            bid: None,
            ask: None,
            hit_offset: tick.ticks(hit_offset_ticks),
        }
    }

    /// Currently resting quote on a side.
    pub fn resting(&self, side: Side) -> Option<&QuoteSlot> {
        match side {
            Side::Buy => self.bid.as_ref(),
            Side::Sell => self.ask.as_ref(),
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<QuoteSlot> {
        match side {
            Side::Buy => &mut self.bid,
            Side::Sell => &mut self.ask,
        }
    }

    /// Desired quote prices `(bid, ask)`, zero where a side should not be
    /// quoted (unknown theo, empty book side, or non-positive bid).
    pub fn desired_prices(theo: Price, book: &BookSnapshot, plan: &RiskPlan) -> (Price, Price) {
        if theo.is_zero() {
            return (Price::ZERO, Price::ZERO);
        }
        let bid = if book.best_bid().is_zero() {
            Price::ZERO
        } else {
            theo.positive_sub(plan.bid_adjustment).unwrap_or(Price::ZERO)
        };
        let ask = if book.best_ask().is_zero() {
            Price::ZERO
        } else {
            theo + plan.ask_adjustment
        };
        (bid, ask)
    }

    /// Send the aggressive hit orders of a plan.
    ///
    /// The sell hit goes out at theo + offset and the buy hit at
    /// theo - offset, both fill-and-kill, so they only trade against a book
    /// that is mispriced relative to theo.
    pub fn place_hits(
        &mut self,
        theo: Price,
        plan: &RiskPlan,
        registry: &mut OrderRegistry,
        ids: &mut OrderIdAllocator,
    ) -> Vec<OrderCommand> {
        let mut commands = Vec::new();
        if theo.is_zero() {
            return commands;
        }

        if plan.sell_hit > 0 {
            let id = ids.next_id();
            let price = theo + self.hit_offset;
            info!(order_id = %id, volume = plan.sell_hit, price = %price, "Hitting (SELL)");
            registry.register(id, OrderRole::Hit(Side::Sell));
            commands.push(OrderCommand::Insert {
                id,
                side: Side::Sell,
                price,
                volume: plan.sell_hit,
                lifespan: Lifespan::FillAndKill,
            });
        }

        if plan.buy_hit > 0 {
            if let Some(price) = theo.positive_sub(self.hit_offset) {
                let id = ids.next_id();
                info!(order_id = %id, volume = plan.buy_hit, price = %price, "Hitting (BUY)");
                registry.register(id, OrderRole::Hit(Side::Buy));
                commands.push(OrderCommand::Insert {
                    id,
                    side: Side::Buy,
                    price,
                    volume: plan.buy_hit,
                    lifespan: Lifespan::FillAndKill,
                });
            }
        }

        commands
    }

    /// Reconcile resting quotes against the desired state.
    ///
    /// Per side: cancel first if the resting price is stale or the side is
    /// breached, then insert if the side is empty and insertion is allowed.
    /// Cancels always precede inserts in the returned list.
    pub fn reconcile(
        &mut self,
        theo: Price,
        book: &BookSnapshot,
        plan: &RiskPlan,
        registry: &mut OrderRegistry,
        ids: &mut OrderIdAllocator,
    ) -> Vec<OrderCommand> {
        let (bid_price, ask_price) = Self::desired_prices(theo, book, plan);
        let mut commands = Vec::new();

        for (side, desired) in [(Side::Buy, bid_price), (Side::Sell, ask_price)] {
            if let Some(cancel) = self.cancel_if_stale(side, desired, plan.breached(side)) {
                commands.push(cancel);
            }
        }
        for (side, desired) in [(Side::Buy, bid_price), (Side::Sell, ask_price)] {
            if let Some(insert) = self.insert_if_absent(side, desired, plan, registry, ids) {
                commands.push(insert);
            }
        }

        commands
    }

    fn cancel_if_stale(
        &mut self,
        side: Side,
        desired: Price,
        breached: bool,
    ) -> Option<OrderCommand> {
        let slot = self.slot_mut(side);
        let resting = slot.as_ref()?;

        let repriced = !desired.is_zero() && desired != resting.price;
        if !repriced && !breached {
            return None;
        }

        info!(
            order_id = %resting.id,
            side = %side,
            resting_price = %resting.price,
            desired_price = %desired,
            breached,
            "Cancelling quote"
        );
        let id = resting.id;
        *slot = None;
        Some(OrderCommand::Cancel { id })
    }

    fn insert_if_absent(
        &mut self,
        side: Side,
        desired: Price,
        plan: &RiskPlan,
        registry: &mut OrderRegistry,
        ids: &mut OrderIdAllocator,
    ) -> Option<OrderCommand> {
        let slot = self.slot_mut(side);
        if slot.is_some() || desired.is_zero() {
            return None;
        }
        if !plan.insert_allowed(side) {
            debug!(
                side = %side,
                volume = plan.volume(side),
                "Quote suppressed by position limit"
            );
            return None;
        }

        let id = ids.next_id();
        let volume = plan.volume(side);
        info!(order_id = %id, side = %side, price = %desired, volume, "Quoting");
        *slot = Some(QuoteSlot {
            id,
            price: desired,
            volume,
        });
        registry.register(id, OrderRole::Quote(side));

        Some(OrderCommand::Insert {
            id,
            side,
            price: desired,
            volume,
            lifespan: Lifespan::GoodForDay,
        })
    }

    /// Clear whichever side holds `id` after a terminal status.
    ///
    /// Returns the side that was cleared, if any. Orders already cancelled by
    /// reconciliation are no longer in a slot and yield `None`.
    pub fn on_order_terminal(&mut self, id: OrderId) -> Option<Side> {
        for side in [Side::Buy, Side::Sell] {
            let slot = self.slot_mut(side);
            if slot.as_ref().is_some_and(|q| q.id == id) {
                *slot = None;
                return Some(side);
            }
        }
        None
    }

    /// Cancel both resting quotes.
    pub fn cancel_all(&mut self) -> Vec<OrderCommand> {
        [Side::Buy, Side::Sell]
            .into_iter()
            .filter_map(|side| self.slot_mut(side).take())
            .map(|quote| {
                info!(order_id = %quote.id, "Cancelling quote (cancel all)");
                OrderCommand::Cancel { id: quote.id }
            })
            .collect()
    }

    /// Number of sides currently resting (0..=2).
    pub fn active_quote_count(&self) -> usize {
        usize::from(self.bid.is_some()) + usize::from(self.ask.is_some())
    }
}
