//! Outstanding order registry.
//!
//! Fill and status callbacks only carry an order id. The registry maps every
//! id we have sent and not yet seen terminate to its role, so a fill can be
//! classified by side and purpose without guessing.

use std::collections::HashMap;

use pairmaker_core::{OrderId, Side};
use tracing::warn;

/// What an order was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderRole {
    /// Resting quote on the primary instrument.
    Quote(Side),
    /// Aggressive fill-and-kill order on the primary instrument.
    Hit(Side),
    /// Hedge on the secondary instrument.
    Hedge(Side),
}

impl OrderRole {
    pub fn side(&self) -> Side {
        match self {
            Self::Quote(side) | Self::Hit(side) | Self::Hedge(side) => *side,
        }
    }

    /// Orders on the primary instrument move the position when filled.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::Hedge(_))
    }
}

/// Map from outstanding order id to role.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: HashMap<OrderId, OrderRole>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly sent order.
    pub fn register(&mut self, id: OrderId, role: OrderRole) {
        if let Some(previous) = self.orders.insert(id, role) {
            warn!(order_id = %id, ?previous, ?role, "Order id registered twice");
        }
    }

    pub fn get(&self, id: OrderId) -> Option<OrderRole> {
        self.orders.get(&id).copied()
    }

    /// Stop tracking an order that reached a terminal state.
    pub fn remove(&mut self, id: OrderId) -> Option<OrderRole> {
        self.orders.remove(&id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Number of outstanding primary orders on a side.
    pub fn outstanding(&self, side: Side) -> usize {
        self.orders
            .values()
            .filter(|role| role.is_primary() && role.side() == side)
            .count()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
