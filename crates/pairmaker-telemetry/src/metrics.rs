//! Prometheus metrics for the pairmaker agent.
//!
//! Recorded by the host event loop from the commands and callbacks it
//! forwards; the strategy itself never touches them.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which only happens at static initialization.

use once_cell::sync::Lazy;
use pairmaker_core::{OrderCommand, Side};
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

use crate::error::TelemetryResult;

/// Orders sent to the exchange.
/// Labels: kind (quote/hit/hedge/cancel)
pub static ORDERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pairmaker_orders_total",
        "Total order commands sent to the exchange",
        &["kind"]
    )
    .unwrap()
});

/// Primary fills.
/// Labels: side (buy/sell)
pub static FILLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pairmaker_fills_total",
        "Total primary fills received",
        &["side"]
    )
    .unwrap()
});

/// Primary lots filled.
pub static FILLED_VOLUME_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pairmaker_filled_volume_total",
        "Total primary lots filled",
        &["side"]
    )
    .unwrap()
});

/// Hedge orders reported failed by the exchange.
pub static HEDGE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pairmaker_hedge_failures_total",
        "Total hedge orders that did not trade"
    )
    .unwrap()
});

/// Exchange error callbacks.
pub static EXCHANGE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pairmaker_exchange_errors_total",
        "Total error callbacks from the exchange"
    )
    .unwrap()
});

/// Replay lines skipped because they failed to parse.
pub static MALFORMED_EVENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pairmaker_malformed_events_total",
        "Total event lines that could not be parsed"
    )
    .unwrap()
});

/// Current signed position on the primary instrument.
pub static POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("pairmaker_position", "Current primary position in lots").unwrap()
});

/// Current theo in cents (0 = unknown).
pub static THEO: Lazy<IntGauge> =
    Lazy::new(|| register_int_gauge!("pairmaker_theo", "Current theo in cents").unwrap());

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    /// Record one outgoing order command.
    pub fn order_sent(command: &OrderCommand) {
        ORDERS_TOTAL.with_label_values(&[command.kind()]).inc();
    }

    /// Record a primary fill.
    pub fn fill(side: Side, volume: u64) {
        let label = side_label(side);
        FILLS_TOTAL.with_label_values(&[label]).inc();
        FILLED_VOLUME_TOTAL
            .with_label_values(&[label])
            .inc_by(volume);
    }

    pub fn hedge_failed() {
        HEDGE_FAILURES_TOTAL.inc();
    }

    pub fn exchange_error() {
        EXCHANGE_ERRORS_TOTAL.inc();
    }

    pub fn malformed_event() {
        MALFORMED_EVENTS_TOTAL.inc();
    }

    /// Set the position gauge.
    pub fn position(position: i64) {
        POSITION.set(position);
    }

    /// Set the theo gauge.
    pub fn theo(cents: u64) {
        THEO.set(i64::try_from(cents).unwrap_or(i64::MAX));
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmaker_core::OrderId;

    #[test]
    fn test_order_sent_counts_by_kind() {
        let before = ORDERS_TOTAL.with_label_values(&["cancel"]).get();
        Metrics::order_sent(&OrderCommand::Cancel { id: OrderId(1) });
        assert!(ORDERS_TOTAL.with_label_values(&["cancel"]).get() > before);
    }

    #[test]
    fn test_fill_counts_volume() {
        let before = FILLED_VOLUME_TOTAL.with_label_values(&["sell"]).get();
        Metrics::fill(Side::Sell, 7);
        assert!(FILLED_VOLUME_TOTAL.with_label_values(&["sell"]).get() >= before + 7);
    }

    #[test]
    fn test_render_contains_registered_metrics() {
        Metrics::position(-12);
        let text = Metrics::render().unwrap();
        assert!(text.contains("pairmaker_position"));
    }
}
