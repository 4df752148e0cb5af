//! Price series types.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The price series a bar belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Bid prices.
    #[display("bid")]
    Bid,
    /// Ask prices.
    #[display("ask")]
    Ask,
    /// Average of bid and ask.
    #[display("avg")]
    Avg,
}

impl PriceType {
    /// Returns the name used by Dukascopy in candle file names, if the vendor publishes the series.
    #[must_use]
    pub const fn vendor_name(&self) -> Option<&'static str> {
        match self {
            Self::Bid => Some("BID"),
            Self::Ask => Some("ASK"),
            Self::Avg => None,
        }
    }

    /// The two series published by the vendor.
    #[must_use]
    pub const fn quoted() -> [Self; 2] {
        [Self::Bid, Self::Ask]
    }
}
