//! Prometheus metrics and structured logging for pairmaker.
//!
//! - Structured logging with tracing (JSON in production), written to stderr
//! - Prometheus counters and gauges for orders, fills, hedges and errors

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
