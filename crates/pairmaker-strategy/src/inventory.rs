//! Inventory tracking and risk policy.
//!
//! Tracks the net position on the primary instrument and turns it into a
//! [`RiskPlan`]: how much to quote on each side, how far from theo, whether
//! new quotes are allowed, and how large the hit orders may be.

use pairmaker_core::{Price, Side, TickSize, MAXIMUM_ASK};
use rust_decimal::Decimal;

use crate::config::StrategyConfig;

/// Quoting decisions derived from the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskPlan {
    /// Bid quote volume after skew.
    pub bid_volume: u64,
    /// Ask quote volume after skew.
    pub ask_volume: u64,
    /// Distance of the bid below theo.
    pub bid_adjustment: Price,
    /// Distance of the ask above theo.
    pub ask_adjustment: Price,
    /// Resting bid must be pulled (position too long).
    pub bid_breached: bool,
    /// Resting ask must be pulled (position too short).
    pub ask_breached: bool,
    /// A new bid may be inserted.
    pub bid_insert_allowed: bool,
    /// A new ask may be inserted.
    pub ask_insert_allowed: bool,
    /// Volume of the aggressive sell hit (0 = none).
    pub sell_hit: u64,
    /// Volume of the aggressive buy hit (0 = none).
    pub buy_hit: u64,
}

impl RiskPlan {
    pub fn volume(&self, side: Side) -> u64 {
        match side {
            Side::Buy => self.bid_volume,
            Side::Sell => self.ask_volume,
        }
    }

    pub fn breached(&self, side: Side) -> bool {
        match side {
            Side::Buy => self.bid_breached,
            Side::Sell => self.ask_breached,
        }
    }

    pub fn insert_allowed(&self, side: Side) -> bool {
        match side {
            Side::Buy => self.bid_insert_allowed,
            Side::Sell => self.ask_insert_allowed,
        }
    }
}

/// Net position and the risk policy applied to it.
#[derive(Debug)]
pub struct InventoryManager {
    /// Net position in lots (positive = long).
    position: i64,
    /// Total lots bought.
    bought: u64,
    /// Total lots sold.
    sold: u64,
    /// Number of fills processed.
    fill_count: u64,
    position_limit: i64,
    lot_size: i64,
    base_volume: i64,
    soft_threshold: i64,
    skew_base_ticks: Decimal,
    skew_min_ticks: Decimal,
    skew_divisor: Decimal,
    tick: TickSize,
}

impl InventoryManager {
    /// Create a flat inventory.
    pub fn new(config: &StrategyConfig, tick: TickSize) -> Self {
        Self {
            position: 0,
            bought: 0,
            sold: 0,
            fill_count: 0,
            position_limit: config.position_limit,
            lot_size: config.lot_size,
            base_volume: config.base_volume,
            soft_threshold: config.soft_threshold,
            skew_base_ticks: config.skew_base_ticks,
            skew_min_ticks: config.skew_min_ticks,
            skew_divisor: config.skew_divisor,
            tick,
        }
    }

    /// Record a primary fill and return the new position.
    ///
    /// Totals saturate rather than wrap.
    pub fn record_fill(&mut self, side: Side, volume: u64) -> i64 {
        match side {
            Side::Buy => self.bought = self.bought.saturating_add(volume),
            Side::Sell => self.sold = self.sold.saturating_add(volume),
        }
        self.position = self.position.saturating_add(side.sign() * lots(volume));
        self.fill_count += 1;
        self.position
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn bought(&self) -> u64 {
        self.bought
    }

    pub fn sold(&self) -> u64 {
        self.sold
    }

    pub fn fill_count(&self) -> u64 {
        self.fill_count
    }

    /// Quote volumes `(bid, ask)` after inventory skew.
    ///
    /// Beyond the soft threshold, the side that would grow the position
    /// shrinks by the overage and the other side grows by the same amount.
    pub fn quote_volumes(&self) -> (u64, u64) {
        let base = self.base_volume;
        let (bid, ask) = if self.position > self.soft_threshold {
            let diff = self.position.saturating_sub(self.soft_threshold);
            (base.saturating_sub(diff), base.saturating_add(diff))
        } else if self.position < -self.soft_threshold {
            let diff = self.position.saturating_neg().saturating_sub(self.soft_threshold);
            (base.saturating_add(diff), base.saturating_sub(diff))
        } else {
            (base, base)
        };
        (non_negative(bid), non_negative(ask))
    }

    /// Quote distances `(bid, ask)` from theo.
    ///
    /// `max(min, base ± position / divisor)` ticks: being long pushes the bid
    /// away and pulls the ask in, and vice versa.
    pub fn price_adjustments(&self) -> (Price, Price) {
        let tick = Decimal::from(self.tick.get());
        let distance = |ticks: Option<Decimal>| {
            ticks
                .map(|t| t.max(self.skew_min_ticks))
                .and_then(|t| t.checked_mul(tick))
                .map(|cents| Price::nearest_tick(cents, self.tick))
                .unwrap_or(MAXIMUM_ASK)
        };
        let skew = Decimal::from(self.position).checked_div(self.skew_divisor);
        (
            distance(skew.and_then(|s| self.skew_base_ticks.checked_add(s))),
            distance(skew.and_then(|s| self.skew_base_ticks.checked_sub(s))),
        )
    }

    /// Hit volumes `(sell, buy)` sized to the headroom left once the
    /// opposite quote is counted as filled.
    pub fn hit_volumes(&self, bid_volume: u64, ask_volume: u64) -> (u64, u64) {
        let sell = self
            .position
            .saturating_add(self.position_limit.saturating_sub(lots(ask_volume)));
        let buy = self
            .position_limit
            .saturating_sub(lots(bid_volume))
            .saturating_sub(self.position);
        (non_negative(sell), non_negative(buy))
    }

    /// Whether a new quote of `volume` keeps the position within the limit
    /// if it fills completely.
    pub fn can_insert(&self, side: Side, volume: u64) -> bool {
        if volume == 0 {
            return false;
        }
        match side {
            Side::Buy => self.position.saturating_add(lots(volume)) <= self.position_limit,
            Side::Sell => self.position.saturating_sub(lots(volume)) >= -self.position_limit,
        }
    }

    /// Whether the position is close enough to the limit that resting quotes
    /// on `side` must be pulled.
    pub fn limit_breached(&self, side: Side) -> bool {
        let threshold = self
            .position_limit
            .saturating_sub(self.lot_size.saturating_mul(2));
        match side {
            Side::Buy => self.position > threshold,
            Side::Sell => self.position < -threshold,
        }
    }

    /// Derive the full quoting plan for the current position.
    pub fn plan(&self) -> RiskPlan {
        let (bid_volume, ask_volume) = self.quote_volumes();
        let (bid_adjustment, ask_adjustment) = self.price_adjustments();
        let (sell_hit, buy_hit) = self.hit_volumes(bid_volume, ask_volume);
        let bid_breached = self.limit_breached(Side::Buy);
        let ask_breached = self.limit_breached(Side::Sell);

        RiskPlan {
            bid_volume,
            ask_volume,
            bid_adjustment,
            ask_adjustment,
            bid_breached,
            ask_breached,
            bid_insert_allowed: !bid_breached && self.can_insert(Side::Buy, bid_volume),
            ask_insert_allowed: !ask_breached && self.can_insert(Side::Sell, ask_volume),
            sell_hit,
            buy_hit,
        }
    }
}

/// Volume as signed lots, saturating at `i64::MAX`.
fn lots(volume: u64) -> i64 {
    i64::try_from(volume).unwrap_or(i64::MAX)
}

fn non_negative(lots: i64) -> u64 {
    u64::try_from(lots).unwrap_or(0)
}
