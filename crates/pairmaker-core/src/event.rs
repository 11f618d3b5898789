//! Callbacks delivered by the exchange layer.
//!
//! The host receives these already parsed (or replays them from JSON lines)
//! and hands them to the strategy one at a time.

use serde::{Deserialize, Serialize};

use crate::book::{check_price, check_volume, BookSnapshot};
use crate::error::Result;
use crate::order::OrderId;
use crate::price::Price;

/// One exchange callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// Periodic order book snapshot.
    OrderBookUpdate(BookSnapshot),
    /// Aggregated trading activity since the previous report.
    TradeTicks(BookSnapshot),
    /// One of our primary orders traded, partially or fully.
    OrderFilled {
        order_id: OrderId,
        price: Price,
        volume: u64,
    },
    /// Status change of a primary order. Remaining volume 0 is terminal.
    OrderStatus {
        order_id: OrderId,
        fill_volume: u64,
        remaining_volume: u64,
        fees: i64,
    },
    /// Hedge result. Price and volume are both zero on failure.
    HedgeFilled {
        order_id: OrderId,
        price: Price,
        volume: u64,
    },
    /// Exchange-detected error. Order id zero means not order specific.
    Error { order_id: OrderId, message: String },
}

impl ExchangeEvent {
    /// Parse one JSON line.
    ///
    /// Prices above `MAXIMUM_ASK` and volumes above `MAXIMUM_VOLUME` are
    /// rejected like any other malformed record.
    pub fn from_json_line(line: &str) -> Result<Self> {
        let event: Self = serde_json::from_str(line)?;
        event.check_bounds()?;
        Ok(event)
    }

    /// Check numeric fields against the exchange's limits.
    pub fn check_bounds(&self) -> Result<()> {
        match self {
            Self::OrderBookUpdate(book) | Self::TradeTicks(book) => book.check_bounds(),
            Self::OrderFilled { price, volume, .. }
            | Self::HedgeFilled { price, volume, .. } => {
                check_price("price", price.inner())?;
                check_volume("volume", *volume)
            }
            Self::OrderStatus {
                fill_volume,
                remaining_volume,
                ..
            } => {
                check_volume("fill_volume", *fill_volume)?;
                check_volume("remaining_volume", *remaining_volume)
            }
            Self::Error { .. } => Ok(()),
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderBookUpdate(_) => "order_book_update",
            Self::TradeTicks(_) => "trade_ticks",
            Self::OrderFilled { .. } => "order_filled",
            Self::OrderStatus { .. } => "order_status",
            Self::HedgeFilled { .. } => "hedge_filled",
            Self::Error { .. } => "error",
        }
    }
}
