//! Merging bid and ask series into the average series.

use rosabar_types::{Bar, HistoryError, Result, Timeframe};

/// Merges a complete bid and ask day into the average series.
///
/// Prices are the rounded mean of bid and ask in points. If the bid ever
/// exceeds the ask (negative spread), high and low are recomputed from the
/// averaged prices so the bar stays consistent. The tick volume is derived
/// from the bar's shape: twice the range minus the body, at least 1.
///
/// # Errors
///
/// Returns [`HistoryError::IncompleteSeries`] if either series doesn't hold
/// exactly one day of bars and [`HistoryError::UnsupportedTimeframe`] for
/// timeframes that don't divide a day.
pub fn merge(bid: &[Bar], ask: &[Bar], timeframe: Timeframe) -> Result<Vec<Bar>> {
    let expected = timeframe
        .bars_per_day()
        .ok_or_else(|| HistoryError::UnsupportedTimeframe {
            timeframe,
            formula: "merge".to_string(),
        })?;
    for (series, bars) in [("bid", bid), ("ask", ask)] {
        if bars.len() != expected {
            return Err(HistoryError::IncompleteSeries {
                series: series.to_string(),
                actual: bars.len(),
                expected,
            });
        }
    }

    Ok(bid.iter().zip(ask).map(|(b, a)| merge_bar(b, a)).collect())
}

fn merge_bar(bid: &Bar, ask: &Bar) -> Bar {
    let open = mean(bid.open, ask.open);
    let mut high = mean(bid.high, ask.high);
    let mut low = mean(bid.low, ask.low);
    let close = mean(bid.close, ask.close);

    let crossed =
        bid.open > ask.open || bid.high > ask.high || bid.low > ask.low || bid.close > ask.close;
    if crossed {
        let (h, l) = (high, low);
        high = open.max(h).max(l).max(close);
        low = open.min(h).min(l).min(close);
    }

    Bar::new(bid.time, open, high, low, close, tick_volume(open, high, low, close))
}

/// Rounded mean of two prices, halves rounded up.
const fn mean(a: u32, b: u32) -> u32 {
    a / 2 + b / 2 + (a % 2 + b % 2 + 1) / 2
}

/// Synthetic tick volume of an average bar.
const fn tick_volume(open: u32, high: u32, low: u32, close: u32) -> u32 {
    let ticks = high.saturating_sub(low).saturating_mul(2);
    let ticks = ticks.saturating_sub(open.abs_diff(close));
    if ticks == 0 { 1 } else { ticks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(open: u32, high: u32, low: u32, close: u32) -> Vec<Bar> {
        (0..1440)
            .map(|i| Bar::new(i * 60, open, high, low, close, 1))
            .collect()
    }

    #[test]
    fn test_mean_rounding() {
        assert_eq!(mean(1, 2), 2);
        assert_eq!(mean(3, 3), 3);
        assert_eq!(mean(100, 103), 102);
        assert_eq!(mean(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_merge_average() {
        let bid = day(100_000, 100_020, 99_990, 100_010);
        let ask = day(100_002, 100_023, 99_992, 100_013);
        let avg = merge(&bid, &ask, Timeframe::Minute1).unwrap();

        assert_eq!(avg.len(), 1440);
        let bar = avg[5];
        assert_eq!(bar.time, 300);
        assert_eq!(bar.open, 100_001);
        assert_eq!(bar.high, 100_022);
        assert_eq!(bar.low, 99_991);
        assert_eq!(bar.close, 100_012);
        // bullish: 2 * 31 - 11
        assert_eq!(bar.ticks, 51);
        assert!(avg.iter().all(|b| b.validate().is_ok()));
    }

    #[test]
    fn test_merge_crossed_market() {
        // bid low above ask low
        let bid = vec![Bar::new(0, 110, 130, 105, 120, 1)];
        let ask = vec![Bar::new(0, 112, 131, 60, 122, 1)];
        let avg = merge_bar(&bid[0], &ask[0]);
        assert_eq!(avg.low, 83);
        assert!(avg.validate().is_ok());

        // negative spread at open pushes the averaged open above the averaged high
        let bid = Bar::new(0, 140, 140, 100, 120, 1);
        let ask = Bar::new(0, 130, 120, 100, 121, 1);
        let avg = merge_bar(&bid, &ask);
        assert_eq!(avg.open, 135);
        assert_eq!(avg.high, 135);
        assert!(avg.is_consistent());
    }

    #[test]
    fn test_tick_volume() {
        // doji
        assert_eq!(tick_volume(10, 12, 8, 10), 8);
        // bearish
        assert_eq!(tick_volume(12, 12, 8, 9), 5);
        // flat
        assert_eq!(tick_volume(10, 10, 10, 10), 1);
        // full body
        assert_eq!(tick_volume(8, 12, 8, 12), 4);
    }

    #[test]
    fn test_merge_incomplete() {
        let bid = day(1, 2, 1, 2);
        let mut ask = day(1, 2, 1, 2);
        ask.pop();
        assert!(matches!(
            merge(&bid, &ask, Timeframe::Minute1),
            Err(HistoryError::IncompleteSeries { ref series, actual: 1439, expected: 1440 }) if series == "ask"
        ));
        assert!(matches!(
            merge(&bid, &ask, Timeframe::Week1),
            Err(HistoryError::UnsupportedTimeframe { .. })
        ));
    }
}
