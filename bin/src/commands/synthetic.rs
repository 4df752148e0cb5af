//! Synthetic command implementation.
//!
//! Computes one FXT day of a synthetic instrument from the stored component
//! history and stores the result.

use anyhow::{Context, Result, bail};
use rosabar_lib::prelude::*;
use rosabar_lib::{StoredHistory, atomic_write};
use std::path::PathBuf;
use tracing::info;

use crate::display::{format_fxt, parse_date};
use crate::layout::default_storage;

/// Days tried from the common history start when no day is given.
const START_SEARCH_DAYS: usize = 14;

/// A synthetic day written to the store.
#[derive(Debug)]
pub(crate) struct StoredDay {
    pub(crate) day: FxtDay,
    pub(crate) first: i64,
    pub(crate) bars: usize,
    pub(crate) path: PathBuf,
}

/// Compute and store one day of a synthetic instrument.
pub(crate) fn synthetic(formula: &str, day: Option<&str>, storage: Option<PathBuf>) -> Result<()> {
    let registry = InstrumentRegistry::global();
    let instrument = registry.require(formula)?;
    if !instrument.is_synthetic() {
        bail!("{} is not a synthetic instrument", instrument.symbol());
    }

    let day = day.map(parse_date).transpose()?.map(FxtDay::from_date);
    let store = HistoryStore::new(storage.unwrap_or_else(default_storage));

    let Some(stored) = compute_and_store(&store, registry, instrument, day)? else {
        if let Some(day) = day {
            println!("{} {day}: component history not available", instrument.symbol());
        }
        return Ok(());
    };
    println!(
        "{} {}: {} bars from {} written to {}",
        instrument.symbol(),
        stored.day,
        stored.bars,
        format_fxt(stored.first),
        stored.path.display()
    );
    Ok(())
}

/// Computes a synthetic day and writes it to the store.
///
/// Without a day the first day with component history is searched, starting
/// at the common history start. Returns `None` if a given day has no
/// component history.
pub(crate) fn compute_and_store(
    store: &HistoryStore,
    registry: &InstrumentRegistry,
    instrument: &Instrument,
    day: Option<FxtDay>,
) -> Result<Option<StoredDay>> {
    let symbol = instrument.symbol();
    let history = StoredHistory::new(store, registry);
    let composer = SyntheticComposer::default();

    let bars = match day {
        Some(day) => composer.compute_day(symbol, Timeframe::Minute1, Some(day), &history),
        None => composer.compute_first_day(symbol, Timeframe::Minute1, &history, START_SEARCH_DAYS),
    }
    .with_context(|| format!("Failed to compute {symbol}"))?;

    let Some(first) = bars.first().map(|b| b.time) else {
        if day.is_none() {
            bail!("{symbol}: no component history within {START_SEARCH_DAYS} days of the common history start");
        }
        return Ok(None);
    };

    let day = FxtDay::of(first);
    let point = instrument.point();
    let bars: Vec<Bar> = bars.iter().map(|b| b.to_points(point)).collect();
    let data = save_day(day, &bars, Timeframe::Minute1)
        .with_context(|| format!("Refusing to store {symbol} {day}"))?;
    let path = store.day_file(instrument.category(), symbol, day, Timeframe::Minute1);
    atomic_write(&path, &data)?;
    info!(symbol, %day, path = %path.display(), "stored");

    Ok(Some(StoredDay {
        day,
        first,
        bars: bars.len(),
        path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MAJORS: [(&str, u32); 6] = [
        ("AUDUSD", 70_120),
        ("EURUSD", 113_540),
        ("GBPUSD", 160_310),
        ("USDCAD", 138_920),
        ("USDCHF", 132_870),
        ("USDJPY", 117_950),
    ];

    // Mon, 04-Aug-2003: AUDUSD and USDCAD history starts on the Sunday before
    fn first_trading_day() -> FxtDay {
        FxtDay::from_date(NaiveDate::from_ymd_opt(2003, 8, 4).unwrap())
    }

    fn store_majors(store: &HistoryStore, day: FxtDay, count: i64) {
        for (symbol, price) in MAJORS {
            let bars: Vec<Bar> = (0..count)
                .map(|i| Bar::new(day.start() + i * 60, price, price, price, price, 1))
                .collect();
            store
                .save_day(Category::Forex, symbol, day, Timeframe::Minute1, &bars)
                .unwrap();
        }
    }

    fn audfxi() -> &'static Instrument {
        InstrumentRegistry::global().require("AUDFXI").unwrap()
    }

    #[test]
    fn test_first_day_after_weekend_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let day = first_trading_day();
        store_majors(&store, day, 1440);

        let stored = compute_and_store(&store, InstrumentRegistry::global(), audfxi(), None)
            .unwrap()
            .unwrap();
        assert_eq!(stored.day, day);
        assert_eq!(stored.first, day.start());
        assert_eq!(stored.bars, 1440);
        assert!(store.exists(Category::Synthetic, "AUDFXI", day, Timeframe::Minute1));

        let bars = store
            .load_day(Category::Synthetic, "AUDFXI", day, Timeframe::Minute1)
            .unwrap()
            .unwrap();
        assert_eq!(bars.len(), 1440);
        assert_eq!(bars[1439].time, day.start() + 1439 * 60);
    }

    #[test]
    fn test_no_history_near_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let result = compute_and_store(&store, InstrumentRegistry::global(), audfxi(), None);
        assert!(result.unwrap_err().to_string().contains("no component history"));
    }

    #[test]
    fn test_given_day_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let day = first_trading_day().next();
        let stored = compute_and_store(&store, InstrumentRegistry::global(), audfxi(), Some(day)).unwrap();
        assert!(stored.is_none());
    }

    #[test]
    fn test_partial_day_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let day = first_trading_day();
        store_majors(&store, day, 10);

        let result = compute_and_store(&store, InstrumentRegistry::global(), audfxi(), Some(day));
        assert!(result.is_err());
        assert!(!store.exists(Category::Synthetic, "AUDFXI", day, Timeframe::Minute1));
    }
}
