//! Top-of-book snapshots.
//!
//! The exchange layer delivers the five best levels per side, best first.
//! Missing levels are reported as zero price and zero volume.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::order::Instrument;
use crate::price::{Price, MAXIMUM_ASK};

/// Number of levels reported per side.
pub const TOP_LEVEL_COUNT: usize = 5;

/// Largest order or level volume the exchange reports.
pub const MAXIMUM_VOLUME: u64 = u32::MAX as u64;

/// Reject a price above [`MAXIMUM_ASK`].
pub(crate) fn check_price(field: &str, price: u64) -> Result<()> {
    if price > MAXIMUM_ASK.inner() {
        return Err(CoreError::OutOfRange(format!("{field}={price}")));
    }
    Ok(())
}

/// Reject a volume above [`MAXIMUM_VOLUME`].
pub(crate) fn check_volume(field: &str, volume: u64) -> Result<()> {
    if volume > MAXIMUM_VOLUME {
        return Err(CoreError::OutOfRange(format!("{field}={volume}")));
    }
    Ok(())
}

/// Classification of the best level on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    /// Both sides have a priced level with volume.
    Valid,
    /// No bid side.
    NoBid,
    /// No ask side.
    NoAsk,
    /// Both sides missing.
    Empty,
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "VALID"),
            Self::NoBid => write!(f, "NO_BID"),
            Self::NoAsk => write!(f, "NO_ASK"),
            Self::Empty => write!(f, "EMPTY"),
        }
    }
}

/// Snapshot of the top of an order book (or of aggregated trade ticks,
/// which share the same layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: Instrument,
    pub sequence_number: u64,
    pub ask_prices: [u64; TOP_LEVEL_COUNT],
    pub ask_volumes: [u64; TOP_LEVEL_COUNT],
    pub bid_prices: [u64; TOP_LEVEL_COUNT],
    pub bid_volumes: [u64; TOP_LEVEL_COUNT],
}

impl BookSnapshot {
    /// Snapshot with no levels on either side.
    pub fn empty(instrument: Instrument, sequence_number: u64) -> Self {
        Self {
            instrument,
            sequence_number,
            ask_prices: [0; TOP_LEVEL_COUNT],
            ask_volumes: [0; TOP_LEVEL_COUNT],
            bid_prices: [0; TOP_LEVEL_COUNT],
            bid_volumes: [0; TOP_LEVEL_COUNT],
        }
    }

    /// Snapshot with a single level per side.
    pub fn top(
        instrument: Instrument,
        sequence_number: u64,
        bid: (u64, u64),
        ask: (u64, u64),
    ) -> Self {
        let mut book = Self::empty(instrument, sequence_number);
        book.bid_prices[0] = bid.0;
        book.bid_volumes[0] = bid.1;
        book.ask_prices[0] = ask.0;
        book.ask_volumes[0] = ask.1;
        book
    }

    pub fn best_bid(&self) -> Price {
        Price(self.bid_prices[0])
    }

    pub fn best_ask(&self) -> Price {
        Price(self.ask_prices[0])
    }

    pub fn best_bid_volume(&self) -> u64 {
        self.bid_volumes[0]
    }

    pub fn best_ask_volume(&self) -> u64 {
        self.ask_volumes[0]
    }

    /// Both best levels carry volume. Books failing this are stale or empty.
    pub fn has_top_volume(&self) -> bool {
        self.best_bid_volume() != 0 && self.best_ask_volume() != 0
    }

    /// Every level within the exchange's price and volume range.
    pub fn check_bounds(&self) -> Result<()> {
        for depth in 0..TOP_LEVEL_COUNT {
            check_price("ask_price", self.ask_prices[depth])?;
            check_price("bid_price", self.bid_prices[depth])?;
            check_volume("ask_volume", self.ask_volumes[depth])?;
            check_volume("bid_volume", self.bid_volumes[depth])?;
        }
        Ok(())
    }

    pub fn state(&self) -> BookState {
        let has_bid = !self.best_bid().is_zero() && self.best_bid_volume() != 0;
        let has_ask = !self.best_ask().is_zero() && self.best_ask_volume() != 0;

        match (has_bid, has_ask) {
            (true, true) => BookState::Valid,
            (false, true) => BookState::NoBid,
            (true, false) => BookState::NoAsk,
            (false, false) => BookState::Empty,
        }
    }
}
