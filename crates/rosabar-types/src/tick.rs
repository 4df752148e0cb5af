//! Tick data representation.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single tick representing a price update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the tick (UTC).
    pub timestamp: DateTime<Utc>,
    /// Ask (offer) price.
    pub ask: f64,
    /// Bid price.
    pub bid: f64,
    /// Volume available at the ask price.
    pub ask_size: f32,
    /// Volume available at the bid price.
    pub bid_size: f32,
}

impl Tick {
    /// Returns the mid price (average of ask and bid).
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.ask + self.bid) / 2.0
    }

    /// Returns the spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Raw tick as read from a Dukascopy tick file (before price normalization).
///
/// The vendor format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds offset from the file's reference hour
/// - `u32`: ask price (raw, in points)
/// - `u32`: bid price (raw, in points)
/// - `f32`: ask size
/// - `f32`: bid size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTick {
    /// Milliseconds offset from the reference time.
    pub time_delta: u32,
    /// Raw ask price.
    pub ask: u32,
    /// Raw bid price.
    pub bid: u32,
    /// Ask size, rounded to 2 decimals.
    pub ask_size: f32,
    /// Bid size, rounded to 2 decimals.
    pub bid_size: f32,
}

impl RawTick {
    /// Size in bytes of a raw tick record.
    pub const SIZE: usize = 20;

    /// Creates a new raw tick.
    #[must_use]
    pub const fn new(time_delta: u32, ask: u32, bid: u32, ask_size: f32, bid_size: f32) -> Self {
        Self {
            time_delta,
            ask,
            bid,
            ask_size,
            bid_size,
        }
    }

    /// Normalizes the raw tick using the instrument's point size.
    ///
    /// For example EUR/USD has a point size of 0.00001, so a raw price of
    /// 112345 becomes 1.12345.
    #[must_use]
    pub fn normalize(self, reference: DateTime<Utc>, point: f64) -> Tick {
        Tick {
            timestamp: reference + TimeDelta::milliseconds(i64::from(self.time_delta)),
            ask: f64::from(self.ask) * point,
            bid: f64::from(self.bid) * point,
            ask_size: self.ask_size,
            bid_size: self.bid_size,
        }
    }
}
