//! Dukascopy URL construction.

use chrono::{Datelike, NaiveDate};
use rosabar_types::PriceType;

/// Base URL for Dukascopy data feed.
pub const BASE_URL: &str = "https://datafeed.dukascopy.com/datafeed";

/// Returns the vendor file name of a day's M1 candles, e.g. `BID_candles_min_1.bi5`.
///
/// Returns `None` for price types the vendor doesn't publish.
#[must_use]
pub fn candle_file_name(price_type: PriceType) -> Option<String> {
    price_type
        .vendor_name()
        .map(|name| format!("{name}_candles_min_1.bi5"))
}

/// Builds the URL of a GMT day's M1 candle file.
///
/// URL format: `{BASE_URL}/{SYMBOL}/{YEAR}/{MONTH}/{DAY}/{BID|ASK}_candles_min_1.bi5`
///
/// Note: Dukascopy uses 0-indexed months (January = 00).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rosabar_fetch::url::candle_url;
/// use rosabar_types::PriceType;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let url = candle_url("audusd", PriceType::Bid, day).unwrap();
/// assert_eq!(url, "https://datafeed.dukascopy.com/datafeed/AUDUSD/2024/00/15/BID_candles_min_1.bi5");
/// ```
#[must_use]
pub fn candle_url(symbol: &str, price_type: PriceType, day: NaiveDate) -> Option<String> {
    let file = candle_file_name(price_type)?;
    Some(format!(
        "{}/{}/{}/{:02}/{:02}/{}",
        BASE_URL,
        symbol.to_uppercase(),
        day.year(),
        day.month0(),
        day.day(),
        file
    ))
}

/// Builds the URL of a symbol's history start file.
#[must_use]
pub fn history_start_url(symbol: &str) -> String {
    format!("{}/{}/metadata/HistoryStart.bi5", BASE_URL, symbol.to_uppercase())
}

/// Builds the URL of the history start file listing all symbols.
#[must_use]
pub fn all_history_starts_url() -> String {
    format!("{BASE_URL}/metadata/HistoryStart.bi5")
}
