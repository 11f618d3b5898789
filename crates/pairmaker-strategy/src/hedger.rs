//! Hedging of primary fills on the secondary instrument.
//!
//! Every classified primary fill is offset immediately by one hedge order of
//! the same volume on the opposite side, priced to cross the whole book.
//! Hedges are fire-and-forget: their results are logged and counted but never
//! fed back into the position.

use pairmaker_core::{OrderCommand, OrderId, OrderIdAllocator, Price, Side, TickSize};
use pairmaker_core::{MAXIMUM_ASK, MINIMUM_BID};
use tracing::{info, warn};

use crate::registry::{OrderRegistry, OrderRole};

/// Result of a hedge reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeOutcome {
    /// Hedge traded at an average `price` for `volume` lots.
    Filled { price: Price, volume: u64 },
    /// Exchange reported price and volume zero.
    Failed,
}

/// Issues hedge orders and tracks their results.
#[derive(Debug)]
pub struct Hedger {
    /// Highest tick-aligned price the exchange accepts, used for buy hedges.
    buy_price: Price,
    hedges_sent: u64,
    hedged_volume: u64,
    failures: u64,
}

impl Hedger {
    pub fn new(tick: TickSize) -> Self {
        Self {
            buy_price: MAXIMUM_ASK.floor_to_tick(tick),
            hedges_sent: 0,
            hedged_volume: 0,
            failures: 0,
        }
    }

    /// Crossing price for a hedge on `side`.
    pub fn price_for(&self, side: Side) -> Price {
        match side {
            Side::Buy => self.buy_price,
            Side::Sell => MINIMUM_BID,
        }
    }

    /// Build the hedge for a primary fill of `volume` lots on `filled_side`.
    pub fn hedge(
        &mut self,
        filled_side: Side,
        volume: u64,
        registry: &mut OrderRegistry,
        ids: &mut OrderIdAllocator,
    ) -> OrderCommand {
        let side = filled_side.opposite();
        let price = self.price_for(side);
        let id = ids.next_id();

        registry.register(id, OrderRole::Hedge(side));
        self.hedges_sent += 1;
        self.hedged_volume += volume;
        info!(order_id = %id, side = %side, volume, price = %price, "Sending hedge");

        OrderCommand::Hedge {
            id,
            side,
            price,
            volume,
        }
    }

    /// Record a hedge result. Unknown ids are logged and otherwise ignored.
    pub fn on_hedge_filled(
        &mut self,
        id: OrderId,
        price: Price,
        volume: u64,
        registry: &mut OrderRegistry,
    ) -> HedgeOutcome {
        match registry.remove(id) {
            Some(OrderRole::Hedge(_)) => {}
            Some(other) => {
                warn!(order_id = %id, role = ?other, "Hedge result for a non-hedge order");
            }
            None => {
                warn!(order_id = %id, "Hedge result for an unknown order");
            }
        }

        if price.is_zero() && volume == 0 {
            self.failures += 1;
            warn!(order_id = %id, "Hedge order failed; position stays unhedged");
            return HedgeOutcome::Failed;
        }

        info!(order_id = %id, volume, average_price = %price, "Hedge filled");
        HedgeOutcome::Filled { price, volume }
    }

    pub fn hedges_sent(&self) -> u64 {
        self.hedges_sent
    }

    pub fn hedged_volume(&self) -> u64 {
        self.hedged_volume
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}
