//! Bar period definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::day::SECONDS_PER_DAY;

/// Bar period, identified by its length in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Tick-by-tick (no aggregation).
    Tick,
    /// 1-minute bars.
    #[default]
    #[serde(rename = "m1")]
    Minute1,
    /// 5-minute bars.
    #[serde(rename = "m5")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "m15")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "m30")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "h1")]
    Hour1,
    /// 4-hour bars.
    #[serde(rename = "h4")]
    Hour4,
    /// Daily bars.
    #[serde(rename = "d1")]
    Day1,
    /// Weekly bars.
    #[serde(rename = "w1")]
    Week1,
    /// Monthly bars (30 days nominal).
    #[serde(rename = "mn1")]
    Month1,
}

impl Timeframe {
    /// Returns the period length in minutes (0 for tick data).
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        match self {
            Self::Tick => 0,
            Self::Minute1 => 1,
            Self::Minute5 => 5,
            Self::Minute15 => 15,
            Self::Minute30 => 30,
            Self::Hour1 => 60,
            Self::Hour4 => 240,
            Self::Day1 => 1440,
            Self::Week1 => 10080,
            Self::Month1 => 43200,
        }
    }

    /// Returns the timeframe with the given length in minutes.
    #[must_use]
    pub const fn from_minutes(minutes: u64) -> Option<Self> {
        match minutes {
            0 => Some(Self::Tick),
            1 => Some(Self::Minute1),
            5 => Some(Self::Minute5),
            15 => Some(Self::Minute15),
            30 => Some(Self::Minute30),
            60 => Some(Self::Hour1),
            240 => Some(Self::Hour4),
            1440 => Some(Self::Day1),
            10080 => Some(Self::Week1),
            43200 => Some(Self::Month1),
            _ => None,
        }
    }

    /// Returns the duration in seconds, or None for tick data.
    #[must_use]
    pub const fn seconds(&self) -> Option<i64> {
        match self {
            Self::Tick => None,
            _ => Some(self.minutes() as i64 * 60),
        }
    }

    /// Returns the number of bars covering one full day.
    ///
    /// Only intraday timeframes dividing a day evenly qualify.
    #[must_use]
    pub const fn bars_per_day(&self) -> Option<usize> {
        match self.seconds() {
            Some(s) if s <= SECONDS_PER_DAY && SECONDS_PER_DAY % s == 0 => {
                Some((SECONDS_PER_DAY / s) as usize)
            }
            _ => None,
        }
    }

    /// Returns true if this is tick data (no aggregation).
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Returns the timeframe as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute15 => "m15",
            Self::Minute30 => "m30",
            Self::Hour1 => "h1",
            Self::Hour4 => "h4",
            Self::Day1 => "d1",
            Self::Week1 => "w1",
            Self::Month1 => "mn1",
        }
    }

    /// Returns all available timeframes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Tick,
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour4,
            Self::Day1,
            Self::Week1,
            Self::Month1,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(Self::Tick),
            "m1" | "1m" | "minute" | "minute1" => Ok(Self::Minute1),
            "m5" | "5m" | "minute5" => Ok(Self::Minute5),
            "m15" | "15m" | "minute15" => Ok(Self::Minute15),
            "m30" | "30m" | "minute30" => Ok(Self::Minute30),
            "h1" | "1h" | "hour" | "hour1" => Ok(Self::Hour1),
            "h4" | "4h" | "hour4" => Ok(Self::Hour4),
            "d1" | "1d" | "day" | "day1" | "daily" => Ok(Self::Day1),
            "w1" | "1w" | "week" | "weekly" => Ok(Self::Week1),
            "mn1" | "month" | "monthly" => Ok(Self::Month1),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', expected one of: tick, m1, m5, m15, m30, h1, h4, d1, w1, mn1",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_seconds() {
        assert_eq!(Timeframe::Tick.seconds(), None);
        assert_eq!(Timeframe::Minute1.seconds(), Some(60));
        assert_eq!(Timeframe::Hour1.seconds(), Some(3600));
        assert_eq!(Timeframe::Day1.seconds(), Some(86400));
    }

    #[test]
    fn test_bars_per_day() {
        assert_eq!(Timeframe::Minute1.bars_per_day(), Some(1440));
        assert_eq!(Timeframe::Hour4.bars_per_day(), Some(6));
        assert_eq!(Timeframe::Day1.bars_per_day(), Some(1));
        assert_eq!(Timeframe::Week1.bars_per_day(), None);
        assert_eq!(Timeframe::Tick.bars_per_day(), None);
    }

    #[test]
    fn test_from_minutes() {
        for tf in Timeframe::all() {
            assert_eq!(Timeframe::from_minutes(u64::from(tf.minutes())), Some(*tf));
        }
        assert_eq!(Timeframe::from_minutes(7), None);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("m1".parse::<Timeframe>().unwrap(), Timeframe::Minute1);
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::Hour1);
        assert_eq!("MN1".parse::<Timeframe>().unwrap(), Timeframe::Month1);
        assert!("invalid".parse::<Timeframe>().is_err());
    }
}
