//! Financial instrument definitions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::FxtDay;

/// Instrument category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Foreign exchange currency pairs.
    Forex,
    /// Precious metals.
    Metals,
    /// Stock indices.
    Index,
    /// Commodities (energy, agriculture).
    Commodity,
    /// Cryptocurrencies.
    Crypto,
    /// Instruments computed from other instruments.
    Synthetic,
}

impl Category {
    /// Returns the category as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forex => "forex",
            Self::Metals => "metals",
            Self::Index => "index",
            Self::Commodity => "commodity",
            Self::Crypto => "crypto",
            Self::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a tradable or synthetic instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Symbol name (e.g. "EURUSD", "AUDFXI").
    symbol: String,
    /// Description of the instrument.
    description: String,
    /// Instrument category.
    category: Category,
    /// Number of decimal digits of a quote.
    digits: u8,
    /// Symbol name at Dukascopy, if the vendor publishes the instrument.
    #[serde(default)]
    dukascopy_symbol: Option<String>,
    /// Earliest available M1 history (FXT wall clock).
    #[serde(default)]
    history_start_m1: Option<NaiveDateTime>,
}

impl Instrument {
    /// Creates a new instrument.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        digits: u8,
        dukascopy_symbol: Option<String>,
        history_start_m1: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            description: description.into(),
            category,
            digits,
            dukascopy_symbol,
            history_start_m1,
        }
    }

    /// Returns the symbol name.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the instrument category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the number of decimal digits of a quote.
    #[must_use]
    pub const fn digits(&self) -> u8 {
        self.digits
    }

    /// Returns the point size, i.e. the smallest quoted price increment.
    #[must_use]
    pub fn point(&self) -> f64 {
        10f64.powi(-i32::from(self.digits))
    }

    /// Returns the Dukascopy symbol name, if the instrument is published by Dukascopy.
    #[must_use]
    pub fn dukascopy_symbol(&self) -> Option<&str> {
        self.dukascopy_symbol.as_deref()
    }

    /// Returns the earliest available M1 history as an FXT timestamp.
    #[must_use]
    pub fn history_start_m1(&self) -> Option<i64> {
        self.history_start_m1.map(|dt| dt.and_utc().timestamp())
    }

    /// Returns true if the instrument trades on the given FXT day.
    #[must_use]
    pub const fn is_trading_day(&self, day: FxtDay) -> bool {
        !day.is_weekend()
    }

    /// Returns true if this is a synthetic instrument.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self.category, Category::Synthetic)
    }

    /// Formats a price in points with the instrument's digits.
    #[must_use]
    pub fn format_points(&self, points: u32) -> String {
        format!(
            "{:.*}",
            usize::from(self.digits),
            f64::from(points) * self.point()
        )
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.symbol, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn eurusd() -> Instrument {
        let start = NaiveDate::from_ymd_opt(2003, 5, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Instrument::new(
            "EURUSD",
            "Euro vs US Dollar",
            Category::Forex,
            5,
            Some("EURUSD".to_string()),
            Some(start),
        )
    }

    #[test]
    fn test_instrument_creation() {
        let instrument = eurusd();
        assert_eq!(instrument.symbol(), "EURUSD");
        assert_eq!(instrument.digits(), 5);
        assert_relative_eq!(instrument.point(), 0.00001);
        assert_eq!(instrument.dukascopy_symbol(), Some("EURUSD"));
        assert!(!instrument.is_synthetic());
    }

    #[test]
    fn test_history_start() {
        let instrument = eurusd();
        assert_eq!(instrument.history_start_m1(), Some(1_052_092_800));
    }

    #[test]
    fn test_format_points() {
        assert_eq!(eurusd().format_points(112_345), "1.12345");
    }

    #[test]
    fn test_trading_day() {
        let instrument = eurusd();
        let sunday = FxtDay::of(1_710_028_800); // Sun, 10-Mar-2024
        assert!(!instrument.is_trading_day(sunday));
        assert!(instrument.is_trading_day(sunday.next()));
    }
}
