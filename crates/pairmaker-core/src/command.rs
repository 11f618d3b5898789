//! Order intents emitted by the strategy.
//!
//! The strategy never talks to the exchange directly. Every handler returns
//! a list of commands which the host forwards, fire-and-forget, to the
//! exchange layer. Their effects come back later as callbacks.

use serde::{Deserialize, Serialize};

use crate::order::{Lifespan, OrderId, Side};
use crate::price::Price;

/// A single request for the exchange layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderCommand {
    /// Insert an order on the primary instrument.
    Insert {
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
        lifespan: Lifespan,
    },
    /// Cancel a primary order. No-op at the exchange if already terminal.
    Cancel { id: OrderId },
    /// Send a hedge order on the secondary instrument.
    Hedge {
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
    },
}

impl OrderCommand {
    /// Order identifier this command refers to.
    pub fn id(&self) -> OrderId {
        match self {
            Self::Insert { id, .. } | Self::Cancel { id } | Self::Hedge { id, .. } => *id,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert {
                lifespan: Lifespan::GoodForDay,
                ..
            } => "quote",
            Self::Insert {
                lifespan: Lifespan::FillAndKill,
                ..
            } => "hit",
            Self::Cancel { .. } => "cancel",
            Self::Hedge { .. } => "hedge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let cmd = OrderCommand::Insert {
            id: OrderId(7),
            side: Side::Sell,
            price: Price(10300),
            volume: 40,
            lifespan: Lifespan::GoodForDay,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "insert");
        assert_eq!(json["id"], 7);
        assert_eq!(json["side"], "sell");
        assert_eq!(json["price"], 10300);
        assert_eq!(json["lifespan"], "good_for_day");
    }

    #[test]
    fn test_command_kind() {
        let hit = OrderCommand::Insert {
            id: OrderId(1),
            side: Side::Buy,
            price: Price(9600),
            volume: 60,
            lifespan: Lifespan::FillAndKill,
        };
        assert_eq!(hit.kind(), "hit");
        assert_eq!(OrderCommand::Cancel { id: OrderId(2) }.kind(), "cancel");
        assert_eq!(OrderCommand::Cancel { id: OrderId(2) }.id(), OrderId(2));
    }
}
