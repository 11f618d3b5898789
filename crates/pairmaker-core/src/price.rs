//! Tick-aligned integer prices.
//!
//! Prices travel as whole cents. Blends and skews are computed with
//! `rust_decimal` and snapped back onto the tick grid through
//! [`Price::nearest_tick`], so there is exactly one rounding rule in the
//! system: nearest tick, ties to the even tick count.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::ops::Add;

use crate::error::{CoreError, Result};

/// Lowest price the exchange accepts on any order.
pub const MINIMUM_BID: Price = Price(1);

/// Highest price the exchange accepts on any order.
pub const MAXIMUM_ASK: Price = Price(2_147_483_647);

/// Minimum price increment, guaranteed nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickSize(NonZeroU64);

impl TickSize {
    /// Create a tick size, rejecting zero.
    pub fn new(cents: u64) -> Result<Self> {
        NonZeroU64::new(cents)
            .map(Self)
            .ok_or(CoreError::InvalidTickSize(cents))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    /// Price of `n` whole ticks.
    #[inline]
    pub fn ticks(&self, n: u64) -> Price {
        Price(self.get().saturating_mul(n))
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price in cents. Zero means "no price".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(cents: u64) -> Self {
        Self(cents)
    }

    #[inline]
    pub fn inner(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_tick_aligned(&self, tick: TickSize) -> bool {
        self.0 % tick.get() == 0
    }

    /// Round down onto the tick grid.
    #[inline]
    pub fn floor_to_tick(&self, tick: TickSize) -> Self {
        Self(self.0 / tick.get() * tick.get())
    }

    /// Snap a decimal amount of cents to the nearest tick.
    ///
    /// Ties go to the even tick count (9950 with tick 100 → 10000, 9850 → 9800).
    /// Negative values snap to zero.
    pub fn nearest_tick(value: Decimal, tick: TickSize) -> Self {
        let tick_dec = Decimal::from(tick.get());
        let ticks =
            (value / tick_dec).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        ticks
            .to_u64()
            .map(|n| tick.ticks(n))
            .unwrap_or(Self::ZERO)
    }

    /// Subtract, returning `None` unless the result is strictly positive.
    #[inline]
    pub fn positive_sub(self, rhs: Price) -> Option<Price> {
        self.0.checked_sub(rhs.0).filter(|&p| p > 0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(cents: u64) -> Self {
        Self(cents)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}
