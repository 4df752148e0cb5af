//! Bar representations: stored, price-valued and vendor records.

use serde::{Deserialize, Serialize};

use crate::{HistoryError, Result};

/// A stored bar with prices in points.
///
/// This is the record written to the local history files. The time is an FXT
/// timestamp aligned to the bar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time (FXT).
    pub time: i64,
    /// Open price in points.
    pub open: u32,
    /// High price in points.
    pub high: u32,
    /// Low price in points.
    pub low: u32,
    /// Close price in points.
    pub close: u32,
    /// Tick volume (real or synthetic).
    pub ticks: u32,
}

impl Bar {
    /// Size in bytes of a stored bar record.
    pub const SIZE: usize = 24;

    /// Creates a new bar.
    #[must_use]
    pub const fn new(time: i64, open: u32, high: u32, low: u32, close: u32, ticks: u32) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            ticks,
        }
    }

    /// Returns true if open and close lie within `[low, high]`.
    ///
    /// `high >= low` follows from `high >= open >= low`.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.open <= self.high
            && self.open >= self.low
            && self.close <= self.high
            && self.close >= self.low
    }

    /// Checks the invariant required before a bar may be persisted.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidBar`] if the prices are inconsistent or
    /// the bar has no ticks.
    pub fn validate(&self) -> Result<()> {
        if !self.is_consistent() || self.ticks == 0 {
            return Err(HistoryError::InvalidBar {
                time: self.time,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
                ticks: self.ticks,
            });
        }
        Ok(())
    }

    /// Returns the price range in points.
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.high.saturating_sub(self.low)
    }

    /// Returns true if close > open.
    #[must_use]
    pub const fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if close < open.
    #[must_use]
    pub const fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Converts the bar to floating point prices.
    #[must_use]
    pub fn to_prices(&self, point: f64) -> PriceBar {
        PriceBar {
            time: self.time,
            open: f64::from(self.open) * point,
            high: f64::from(self.high) * point,
            low: f64::from(self.low) * point,
            close: f64::from(self.close) * point,
            ticks: self.ticks,
        }
    }
}

/// A bar with floating point prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time (FXT).
    pub time: i64,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Tick volume.
    pub ticks: u32,
}

impl PriceBar {
    /// Creates a new price bar.
    #[must_use]
    pub const fn new(time: i64, open: f64, high: f64, low: f64, close: f64, ticks: u32) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            ticks,
        }
    }

    /// Converts the prices to points, rounding to the nearest point.
    #[must_use]
    pub fn to_points(&self, point: f64) -> Bar {
        Bar {
            time: self.time,
            open: to_points(self.open, point),
            high: to_points(self.high, point),
            low: to_points(self.low, point),
            close: to_points(self.close, point),
            ticks: self.ticks,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_points(price: f64, point: f64) -> u32 {
    // saturating float-to-int cast
    (price / point).round() as u32
}

/// A bar record as stored in a Dukascopy candle file.
///
/// The vendor format stores bars as 24 bytes in big-endian order:
/// - `u32`: seconds offset from the start of the file's GMT day
/// - `u32`: open (raw, in points)
/// - `u32`: close
/// - `u32`: low
/// - `u32`: high
/// - `f32`: volume in lots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    /// Seconds offset from the start of the file's GMT day.
    pub time_delta: u32,
    /// Raw open price.
    pub open: u32,
    /// Raw close price.
    pub close: u32,
    /// Raw low price.
    pub low: u32,
    /// Raw high price.
    pub high: u32,
    /// Volume in lots, rounded to 2 decimals.
    pub lots: f32,
}

impl RawBar {
    /// Size in bytes of a vendor bar record.
    pub const SIZE: usize = 24;

    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(time_delta: u32, open: u32, close: u32, low: u32, high: u32, lots: f32) -> Self {
        Self {
            time_delta,
            open,
            close,
            low,
            high,
            lots,
        }
    }

    /// Returns true if open and close lie within `[low, high]`.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.open <= self.high
            && self.open >= self.low
            && self.close <= self.high
            && self.close >= self.low
    }

    /// Recomputes high and low from all four prices.
    ///
    /// Returns true if the bar was changed.
    pub fn repair(&mut self) -> bool {
        if self.is_consistent() {
            return false;
        }
        let (o, h, l, c) = (self.open, self.high, self.low, self.close);
        self.high = o.max(h).max(l).max(c);
        self.low = o.min(h).min(l).min(c);
        true
    }
}

/// A vendor bar with absolute GMT and FXT times attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedBar {
    /// The vendor record.
    pub bar: RawBar,
    /// Absolute GMT open time.
    pub time_gmt: i64,
    /// Offset of the open time within the GMT day.
    pub delta_gmt: i64,
    /// Absolute FXT open time.
    pub time_fxt: i64,
    /// Offset of the open time within the FXT day.
    pub delta_fxt: i64,
}

impl AlignedBar {
    /// Returns the bar as a stored bar at its FXT time.
    ///
    /// The tick volume is the lot volume rounded to a whole number.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_bar(&self) -> Bar {
        Bar {
            time: self.time_fxt,
            open: self.bar.open,
            high: self.bar.high,
            low: self.bar.low,
            close: self.bar.close,
            ticks: self.bar.lots.round() as u32,
        }
    }

    /// Returns the FXT day start this bar belongs to.
    #[must_use]
    pub const fn fxt_day_start(&self) -> i64 {
        self.time_fxt - self.delta_fxt
    }
}
