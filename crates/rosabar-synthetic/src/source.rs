//! Access to component history.

use std::collections::HashMap;

use rosabar_history::HistoryStore;
use rosabar_instruments::InstrumentRegistry;
use rosabar_types::{FxtDay, PriceBar, Result, Timeframe};

/// Source of the M1 history of component instruments.
pub trait ComponentHistory {
    /// Returns the start of a symbol's M1 history in FXT seconds, if any.
    fn history_start_m1(&self, symbol: &str) -> Option<i64>;

    /// Returns a symbol's M1 bars of an FXT day, or `None` if not available.
    ///
    /// # Errors
    ///
    /// Returns an error if existing history can't be read.
    fn day_bars(&self, symbol: &str, day: FxtDay) -> Result<Option<Vec<PriceBar>>>;
}

/// Component history held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    starts: HashMap<String, i64>,
    days: HashMap<(String, FxtDay), Vec<PriceBar>>,
}

impl InMemoryHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the M1 history start of a symbol.
    pub fn set_history_start(&mut self, symbol: &str, start: i64) {
        self.starts.insert(symbol.to_uppercase(), start);
    }

    /// Adds the bars of a day.
    pub fn insert_day(&mut self, symbol: &str, day: FxtDay, bars: Vec<PriceBar>) {
        self.days.insert((symbol.to_uppercase(), day), bars);
    }
}

impl ComponentHistory for InMemoryHistory {
    fn history_start_m1(&self, symbol: &str) -> Option<i64> {
        self.starts.get(&symbol.to_uppercase()).copied()
    }

    fn day_bars(&self, symbol: &str, day: FxtDay) -> Result<Option<Vec<PriceBar>>> {
        Ok(self.days.get(&(symbol.to_uppercase(), day)).cloned())
    }
}

/// Component history read from the local history store.
///
/// History starts come from the instrument registry unless overridden.
#[derive(Debug)]
pub struct StoredHistory<'a> {
    store: &'a HistoryStore,
    instruments: &'a InstrumentRegistry,
    starts: HashMap<String, i64>,
}

impl<'a> StoredHistory<'a> {
    /// Creates a history over a store.
    #[must_use]
    pub fn new(store: &'a HistoryStore, instruments: &'a InstrumentRegistry) -> Self {
        Self {
            store,
            instruments,
            starts: HashMap::new(),
        }
    }

    /// Overrides the M1 history start of a symbol.
    #[must_use]
    pub fn with_history_start(mut self, symbol: &str, start: i64) -> Self {
        self.starts.insert(symbol.to_uppercase(), start);
        self
    }
}

impl ComponentHistory for StoredHistory<'_> {
    fn history_start_m1(&self, symbol: &str) -> Option<i64> {
        self.starts
            .get(&symbol.to_uppercase())
            .copied()
            .or_else(|| self.instruments.get(symbol)?.history_start_m1())
    }

    fn day_bars(&self, symbol: &str, day: FxtDay) -> Result<Option<Vec<PriceBar>>> {
        let instrument = self.instruments.require(symbol)?;
        let point = instrument.point();
        let bars = self
            .store
            .load_day(instrument.category(), instrument.symbol(), day, Timeframe::Minute1)?;
        Ok(bars.map(|bars| bars.iter().map(|b| b.to_prices(point)).collect()))
    }
}
