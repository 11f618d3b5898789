//! Reference price (theo) calculation.
//!
//! Theo is a volume-weighted blend of the best bid and best ask in which each
//! side's volume pulls the price toward the *opposite* side: a bid-heavy book
//! signals buying pressure, so theo leans toward the ask.
//!
//! ```text
//!         Σ bid_vol[i]·w(i)·ask + ask_vol[i]·w(i)·bid
//! theo = ─────────────────────────────────────────────     w(i) = e^(−i)
//!              Σ bid_vol[i]·w(i) + ask_vol[i]·w(i)
//! ```
//!
//! With a single level the weights are all 1 and the formula reduces to the
//! classic volume-crossed mid. The result is snapped to the nearest tick,
//! ties to even.

use pairmaker_core::{BookSnapshot, Price, TickSize, TOP_LEVEL_COUNT};
use rust_decimal::Decimal;
use tracing::warn;

/// Weight of a book level by its depth index (0 = best level).
pub fn depth_weight(depth: usize) -> Decimal {
    if depth == 0 {
        return Decimal::ONE;
    }
    Decimal::from_f64_retain((-(depth as f64)).exp()).unwrap_or(Decimal::ZERO)
}

/// Compute theo from a book snapshot.
///
/// # Arguments
/// * `book` - Snapshot of the primary instrument
/// * `tick` - Tick size used for rounding
/// * `levels` - Number of levels to blend, clamped to `1..=TOP_LEVEL_COUNT`
///
/// # Returns
/// Tick-aligned theo, or `Price::ZERO` when no price can be determined
/// (no ask price, no volume on the blended levels, or values too large to
/// blend).
pub fn weighted_mid(book: &BookSnapshot, tick: TickSize, levels: usize) -> Price {
    let best_ask = book.best_ask();
    if best_ask.is_zero() {
        return Price::ZERO;
    }

    match blend(book, levels) {
        Some((_, weight_total)) if weight_total.is_zero() => Price::ZERO,
        Some((weighted_sum, weight_total)) => match weighted_sum.checked_div(weight_total) {
            Some(mid) => Price::nearest_tick(mid, tick),
            None => Price::ZERO,
        },
        None => {
            warn!(
                sequence = book.sequence_number,
                best_bid = %book.best_bid(),
                best_ask = %best_ask,
                "Book values overflow the theo blend, theo unavailable"
            );
            Price::ZERO
        }
    }
}

/// `(Σ volume·weight·opposite price, Σ volume·weight)`, `None` on overflow.
fn blend(book: &BookSnapshot, levels: usize) -> Option<(Decimal, Decimal)> {
    let ask = Decimal::from(book.best_ask().inner());
    let bid = Decimal::from(book.best_bid().inner());

    let mut weighted_sum = Decimal::ZERO;
    let mut weight_total = Decimal::ZERO;
    for depth in 0..levels.clamp(1, TOP_LEVEL_COUNT) {
        let w = depth_weight(depth);
        let bid_volume = Decimal::from(book.bid_volumes[depth]).checked_mul(w)?;
        let ask_volume = Decimal::from(book.ask_volumes[depth]).checked_mul(w)?;

        let level_sum = bid_volume
            .checked_mul(ask)?
            .checked_add(ask_volume.checked_mul(bid)?)?;
        weighted_sum = weighted_sum.checked_add(level_sum)?;
        weight_total = weight_total.checked_add(bid_volume.checked_add(ask_volume)?)?;
    }
    Some((weighted_sum, weight_total))
}
