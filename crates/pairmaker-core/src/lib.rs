//! Core domain types for the pairmaker market-making agent.
//!
//! This crate provides the vocabulary shared by the strategy and the host:
//! - `Instrument`, `Side`, `Lifespan`: Trading enums
//! - `OrderId`, `OrderIdAllocator`: Process-wide order identifiers
//! - `Price`: Tick-aligned integer prices
//! - `BookSnapshot`: Top-of-book levels as delivered by the exchange layer
//! - `OrderCommand`: Abstract order intents emitted by the strategy
//! - `ExchangeEvent`: Callbacks delivered by the exchange layer

pub mod book;
pub mod command;
pub mod error;
pub mod event;
pub mod order;
pub mod price;

pub use book::{BookSnapshot, BookState, MAXIMUM_VOLUME, TOP_LEVEL_COUNT};
pub use command::OrderCommand;
pub use error::{CoreError, Result};
pub use event::ExchangeEvent;
pub use order::{Instrument, Lifespan, OrderId, OrderIdAllocator, Side};
pub use price::{Price, TickSize, MAXIMUM_ASK, MINIMUM_BID};
