//! Day-by-day computation of synthetic instruments.

use rosabar_types::{FxtDay, HistoryError, PriceBar, Result, Timeframe};
use tracing::{debug, info};

use crate::{ComponentHistory, ComponentSet, FormulaRegistry, SyntheticFormula};

/// Computes synthetic instrument history from component history.
#[derive(Debug, Clone, Default)]
pub struct SyntheticComposer {
    registry: FormulaRegistry,
}

impl SyntheticComposer {
    /// Creates a composer over the given formulas.
    #[must_use]
    pub const fn new(registry: FormulaRegistry) -> Self {
        Self { registry }
    }

    /// Returns the formula registry.
    #[must_use]
    pub const fn registry(&self) -> &FormulaRegistry {
        &self.registry
    }

    /// Returns the first component set whose components all have history.
    pub fn select_set<H: ComponentHistory + ?Sized>(
        formula: &SyntheticFormula,
        history: &H,
    ) -> Option<&'static ComponentSet> {
        formula.sets.iter().find(|set| {
            set.symbols()
                .iter()
                .all(|symbol| history.history_start_m1(symbol).is_some())
        })
    }

    /// Returns the first M1 time all symbols have history for.
    pub fn common_history_start<H: ComponentHistory + ?Sized>(symbols: &[&str], history: &H) -> Option<i64> {
        symbols
            .iter()
            .map(|symbol| history.history_start_m1(symbol))
            .try_fold(i64::MIN, |latest, start| Some(latest.max(start?)))
            .filter(|_| !symbols.is_empty())
    }

    /// Computes one FXT day of a synthetic instrument.
    ///
    /// Without a day (or with day 0) the first day all components have
    /// history for is computed. An empty series is returned if no component
    /// set is available, the day is not a trading day, or a component has no
    /// bars for the day.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnsupportedTimeframe`] for timeframes other
    /// than M1, [`HistoryError::UnknownInstrument`] for an unknown formula and
    /// [`HistoryError::IncompleteSeries`] if component series differ in length.
    pub fn compute_day<H: ComponentHistory + ?Sized>(
        &self,
        formula_id: &str,
        timeframe: Timeframe,
        day: Option<FxtDay>,
        history: &H,
    ) -> Result<Vec<PriceBar>> {
        let formula = self.formula(formula_id, timeframe)?;
        let Some(set) = Self::select_set(formula, history) else {
            debug!(formula = formula.id, "no component set with available history");
            return Ok(Vec::new());
        };
        let symbols = set.symbols();

        let day = match day.filter(|d| d.index() != 0) {
            Some(day) => day,
            None => match Self::common_history_start(symbols, history) {
                Some(start) => FxtDay::of(start),
                None => return Ok(Vec::new()),
            },
        };
        if day.is_weekend() {
            debug!(formula = formula.id, %day, "skipping non-trading day");
            return Ok(Vec::new());
        }

        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match history.day_bars(symbol, day)? {
                Some(bars) if !bars.is_empty() => series.push(bars),
                _ => {
                    debug!(formula = formula.id, symbol, %day, "component history not available");
                    return Ok(Vec::new());
                }
            }
        }
        let expected = series[0].len();
        for (symbol, bars) in symbols.iter().zip(&series) {
            if bars.len() != expected {
                return Err(HistoryError::IncompleteSeries {
                    series: (*symbol).to_string(),
                    actual: bars.len(),
                    expected,
                });
            }
        }

        info!(formula = formula.id, set = set.name(), %day, "calculating M1 history");
        Ok(evaluate_series(formula, set, &series))
    }

    /// Computes the first day with data, starting at the common history start.
    ///
    /// The history start of a component may fall on a weekend or a day the
    /// vendor has no data for. Up to `search_days` days from the start are
    /// tried in order. An empty series is returned if none of them has data.
    ///
    /// # Errors
    ///
    /// See [`Self::compute_day`].
    pub fn compute_first_day<H: ComponentHistory + ?Sized>(
        &self,
        formula_id: &str,
        timeframe: Timeframe,
        history: &H,
        search_days: usize,
    ) -> Result<Vec<PriceBar>> {
        let formula = self.formula(formula_id, timeframe)?;
        let Some(start) = Self::select_set(formula, history)
            .and_then(|set| Self::common_history_start(set.symbols(), history))
        else {
            return Ok(Vec::new());
        };

        let mut day = FxtDay::of(start);
        for _ in 0..search_days {
            let bars = self.compute_day(formula_id, timeframe, Some(day), history)?;
            if !bars.is_empty() {
                return Ok(bars);
            }
            day = day.next();
        }
        debug!(formula = formula.id, start = %FxtDay::of(start), search_days, "no day with component history");
        Ok(Vec::new())
    }

    fn formula(&self, formula_id: &str, timeframe: Timeframe) -> Result<&SyntheticFormula> {
        if timeframe != Timeframe::Minute1 {
            return Err(HistoryError::UnsupportedTimeframe {
                timeframe,
                formula: formula_id.to_uppercase(),
            });
        }
        self.registry
            .get(formula_id)
            .ok_or_else(|| HistoryError::UnknownInstrument(formula_id.to_string()))
    }
}

/// Evaluates a component set bar by bar.
///
/// Open and close are computed independently and rounded to the formula's
/// digits. High and low are the larger and smaller of the two, the tick
/// volume is twice their distance in points (1 if equal).
fn evaluate_series(formula: &SyntheticFormula, set: &ComponentSet, series: &[Vec<PriceBar>]) -> Vec<PriceBar> {
    let scale = 10f64.powi(i32::from(formula.digits));
    let mut prices = vec![0.0; series.len()];
    let mut evaluate = |i: usize, price: fn(&PriceBar) -> f64| -> i64 {
        for (p, bars) in prices.iter_mut().zip(series) {
            *p = price(&bars[i]);
        }
        to_points(set.evaluate(&prices), scale)
    };

    (0..series[0].len())
        .map(|i| {
            let open = evaluate(i, |b| b.open);
            let close = evaluate(i, |b| b.close);
            let (high, low) = if open > close { (open, close) } else { (close, open) };
            let ticks = if open == close {
                1
            } else {
                u32::try_from(open.abs_diff(close).saturating_mul(2)).unwrap_or(u32::MAX)
            };
            PriceBar::new(
                series[0][i].time,
                from_points(open, scale),
                from_points(high, scale),
                from_points(low, scale),
                from_points(close, scale),
                ticks,
            )
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn to_points(price: f64, scale: f64) -> i64 {
    // saturating float-to-int cast
    (price * scale).round() as i64
}

#[allow(clippy::cast_precision_loss)]
fn from_points(points: i64, scale: f64) -> f64 {
    points as f64 / scale
}

/// Computes one FXT day of a synthetic instrument with the built-in formulas.
///
/// See [`SyntheticComposer::compute_day`].
///
/// # Errors
///
/// See [`SyntheticComposer::compute_day`].
pub fn compute_synthetic_day<H: ComponentHistory + ?Sized>(
    formula_id: &str,
    timeframe: Timeframe,
    day: Option<FxtDay>,
    history: &H,
) -> Result<Vec<PriceBar>> {
    SyntheticComposer::default().compute_day(formula_id, timeframe, day, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryHistory;
    use approx::assert_relative_eq;

    // Tue, 09-Jan-2024
    const TUESDAY: i64 = 1_704_758_400;

    fn flat_day(day: FxtDay, price: f64) -> Vec<PriceBar> {
        (0..1440)
            .map(|i| PriceBar::new(day.start() + i * 60, price, price, price, price, 1))
            .collect()
    }

    fn fast_history(day: FxtDay) -> InMemoryHistory {
        let mut history = InMemoryHistory::new();
        history.set_history_start("AUDUSD", TUESDAY - 86_400);
        history.set_history_start("USDLFX", TUESDAY);

        let mut audusd = flat_day(day, 0.6612);
        let mut usdlfx = flat_day(day, 1.185);
        audusd[700].open = 0.66135;
        usdlfx[700].open = 1.18492;
        audusd[1439].open = 0.66098;
        usdlfx[1439].open = 1.1853;
        audusd[1439].close = 0.66098;
        usdlfx[1439].close = 1.1853;
        history.insert_day("AUDUSD", day, audusd);
        history.insert_day("USDLFX", day, usdlfx);
        history
    }

    #[test]
    fn test_audfxi_fast_formula() {
        let day = FxtDay::of(TUESDAY);
        let history = fast_history(day);
        let bars = compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(day), &history).unwrap();

        assert_eq!(bars.len(), 1440);
        // pow(1.185 * 0.6612, 7/6) = 0.752303...
        assert_relative_eq!(bars[0].open, 0.75230, epsilon = 1e-12);
        assert_eq!(bars[0].ticks, 1);
        assert_eq!(bars[0].time, day.start());

        // pow(1.18492 * 0.66135, 7/6) = 0.752443...
        let bar = bars[700];
        assert_relative_eq!(bar.open, 0.75244, epsilon = 1e-12);
        assert_relative_eq!(bar.close, 0.75230, epsilon = 1e-12);
        assert_relative_eq!(bar.high, bar.open);
        assert_relative_eq!(bar.low, bar.close);
        assert_eq!(bar.ticks, 28);

        // pow(1.1853 * 0.66098, 7/6) = 0.752233...
        assert_relative_eq!(bars[1439].open, 0.75223, epsilon = 1e-12);
        assert_relative_eq!(bars[1439].close, 0.75223, epsilon = 1e-12);
    }

    #[test]
    fn test_finds_common_history_start() {
        let history = fast_history(FxtDay::of(TUESDAY));
        let bars = compute_synthetic_day("audfxi", Timeframe::Minute1, None, &history).unwrap();
        assert_eq!(bars.len(), 1440);
        assert_eq!(bars[0].time, TUESDAY);

        let bars = compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(FxtDay::from_index(0)), &history)
            .unwrap();
        assert_eq!(bars.len(), 1440);
    }

    #[test]
    fn test_first_day_skips_weekend_start() {
        // Sun, 07-Jan-2024
        let sunday = FxtDay::of(TUESDAY - 2 * 86_400);
        let day = FxtDay::of(TUESDAY);
        let mut history = fast_history(day);
        history.set_history_start("AUDUSD", sunday.start());
        history.set_history_start("USDLFX", sunday.start() + 3600);

        let composer = SyntheticComposer::default();
        assert!(composer
            .compute_day("AUDFXI", Timeframe::Minute1, None, &history)
            .unwrap()
            .is_empty());

        // Sunday is skipped, Monday has no component data
        let bars = composer
            .compute_first_day("AUDFXI", Timeframe::Minute1, &history, 5)
            .unwrap();
        assert_eq!(bars.len(), 1440);
        assert_eq!(bars[0].time, day.start());

        assert!(composer
            .compute_first_day("AUDFXI", Timeframe::Minute1, &history, 2)
            .unwrap()
            .is_empty());
        assert!(composer
            .compute_first_day("AUDFXI", Timeframe::Minute1, &InMemoryHistory::new(), 5)
            .unwrap()
            .is_empty());
        assert!(matches!(
            composer.compute_first_day("AUDFXI", Timeframe::Hour1, &history, 5),
            Err(HistoryError::UnsupportedTimeframe { .. })
        ));
    }

    #[test]
    fn test_falls_back_to_majors() {
        let day = FxtDay::of(TUESDAY);
        let mut history = InMemoryHistory::new();
        let quotes = [
            ("AUDUSD", 0.6612),
            ("EURUSD", 1.0875),
            ("GBPUSD", 1.2701),
            ("USDCAD", 1.3542),
            ("USDCHF", 0.8834),
            ("USDJPY", 149.12),
        ];
        for (symbol, price) in quotes {
            history.set_history_start(symbol, TUESDAY);
            history.insert_day(symbol, day, flat_day(day, price));
        }

        let composer = SyntheticComposer::default();
        let formula = composer.registry().get("AUDFXI").unwrap();
        assert_eq!(SyntheticComposer::select_set(formula, &history).map(ComponentSet::name), Some("majors"));

        let audfxi = composer
            .compute_day("AUDFXI", Timeframe::Minute1, Some(day), &history)
            .unwrap();
        let usdlfx = composer
            .compute_day("USDLFX", Timeframe::Minute1, Some(day), &history)
            .unwrap();
        assert_eq!(audfxi.len(), 1440);
        assert_eq!(usdlfx.len(), 1440);
        assert!(audfxi.iter().all(|b| b.ticks == 1));
    }

    #[test]
    fn test_empty_results() {
        let day = FxtDay::of(TUESDAY);

        // no component set available
        let history = InMemoryHistory::new();
        assert!(compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(day), &history)
            .unwrap()
            .is_empty());

        // Saturday
        let history = fast_history(day);
        let saturday = FxtDay::of(TUESDAY + 4 * 86_400);
        assert!(compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(saturday), &history)
            .unwrap()
            .is_empty());

        // empty component series
        let mut history = fast_history(day);
        history.insert_day("USDLFX", day, Vec::new());
        assert!(compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(day), &history)
            .unwrap()
            .is_empty());

        // missing day
        assert!(compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(day.next()), &history)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_errors() {
        let day = FxtDay::of(TUESDAY);
        let mut history = fast_history(day);
        assert!(matches!(
            compute_synthetic_day("AUDFXI", Timeframe::Hour1, Some(day), &history),
            Err(HistoryError::UnsupportedTimeframe { timeframe: Timeframe::Hour1, ref formula }) if formula == "AUDFXI"
        ));
        assert!(matches!(
            compute_synthetic_day("EURUSD", Timeframe::Minute1, Some(day), &history),
            Err(HistoryError::UnknownInstrument(_))
        ));

        let mut short = flat_day(day, 1.185);
        short.truncate(1000);
        history.insert_day("USDLFX", day, short);
        assert!(matches!(
            compute_synthetic_day("AUDFXI", Timeframe::Minute1, Some(day), &history),
            Err(HistoryError::IncompleteSeries { actual: 1000, expected: 1440, .. })
        ));
    }
}
