//! pairmaker host application.
//!
//! Wires the strategy to the outside world:
//! - Exchange events replayed from JSON lines (file or stdin)
//! - Order commands forwarded through an [`OrderGateway`]
//! - Optional sweep ticker
//! - Metrics recording and graceful shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod replay;
pub mod sweep;

pub use app::{AppEvent, Application, RunSummary};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use gateway::{JsonLinesGateway, OrderGateway};
