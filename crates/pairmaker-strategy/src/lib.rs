//! Market making strategy for pairmaker.
//!
//! Provides the decision core of the agent:
//! - Reference price (theo) from the top of the book
//! - Inventory-driven quote volumes, price skew and hit orders
//! - Quote lifecycle management (one bid, one ask, cancel/replace)
//! - Hedging of every primary fill on the secondary instrument
//!
//! # Architecture
//!
//! ```text
//! Book update → AutoTrader.on_order_book_update()
//!                ├─ pricing: weighted mid → theo
//!                ├─ InventoryManager: RiskPlan (volumes, skew, hits)
//!                └─ QuoteManager: hits + cancel/insert per side
//!                     ↓
//!                Vec<OrderCommand> (host forwards to the exchange)
//!
//! Fill → AutoTrader.on_order_filled()
//!          ├─ OrderRegistry: classify by role
//!          ├─ InventoryManager: update position
//!          └─ Hedger: opposite-side hedge on the secondary instrument
//! ```

pub mod config;
pub mod error;
pub mod hedger;
pub mod inventory;
pub mod pricing;
pub mod quote_manager;
pub mod registry;
pub mod trader;

pub use config::StrategyConfig;
pub use error::{StrategyError, StrategyResult};
pub use hedger::{HedgeOutcome, Hedger};
pub use inventory::{InventoryManager, RiskPlan};
pub use pricing::weighted_mid;
pub use quote_manager::{QuoteManager, QuoteSlot};
pub use registry::{OrderRegistry, OrderRole};
pub use trader::AutoTrader;
