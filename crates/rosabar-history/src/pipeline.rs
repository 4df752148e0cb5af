//! The per-symbol update pipeline.

use std::path::PathBuf;

use rosabar_codec::{DecodeContext, decode_bars_checked, encode_bars};
use rosabar_time::{Fxt, TimezoneRules, align_bars};
use rosabar_types::{
    AlignedBar, Bar, FxtDay, HistoryError, Instrument, PriceType, Result, SECONDS_PER_DAY, Timeframe,
};
use tracing::{debug, info};

use crate::{DayBarBuffer, HistoryStartCache, merge};

/// Configuration of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Root directory of the local history.
    pub storage: PathBuf,
    /// Keep downloaded vendor files next to the history.
    pub keep_downloads: bool,
    /// Timeframe of the stored history.
    pub timeframe: Timeframe,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            storage: PathBuf::from("data"),
            keep_downloads: false,
            timeframe: Timeframe::Minute1,
        }
    }
}

/// Decodes, aligns and buffers one vendor candle file.
///
/// `ctx.day` is the GMT day the file covers.
///
/// # Errors
///
/// Fails if the data is malformed, doesn't hold one day of bars, the time
/// rules don't cover the day, or the bars don't continue the buffered data.
pub fn process_vendor_day<R: TimezoneRules>(
    buffer: &mut DayBarBuffer,
    rules: &R,
    ctx: &DecodeContext<'_>,
    data: &[u8],
) -> Result<()> {
    let decoded = decode_bars_checked(data, ctx)?;
    let expected = buffer.bars_per_day();
    if decoded.bars.len() != expected {
        return Err(HistoryError::IncompleteSeries {
            series: format!("{} {} vendor", ctx.symbol, ctx.price_type),
            actual: decoded.bars.len(),
            expected,
        });
    }

    let aligned = align_bars(ctx.day.start(), decoded.bars, rules)?;
    info!(
        symbol = ctx.symbol,
        price_type = %ctx.price_type,
        day = %ctx.day,
        repaired = decoded.repaired,
        dst_switch = aligned.switched(),
        "processed vendor file"
    );
    buffer.append(ctx.price_type, aligned)
}

/// Merges the buffered bid and ask series of an FXT day.
///
/// # Errors
///
/// Returns [`HistoryError::IncompleteSeries`] if either series is not a
/// complete day.
pub fn merge_day(buffer: &DayBarBuffer, day: FxtDay) -> Result<Vec<Bar>> {
    let series = |price_type: PriceType| -> Result<Vec<Bar>> {
        let bars = buffer.get(price_type, day).unwrap_or_default();
        if !buffer.is_complete(price_type, day) {
            return Err(HistoryError::IncompleteSeries {
                series: price_type.to_string(),
                actual: bars.len(),
                expected: buffer.bars_per_day(),
            });
        }
        Ok(bars.iter().map(AlignedBar::to_bar).collect())
    };
    let bid = series(PriceType::Bid)?;
    let ask = series(PriceType::Ask)?;
    merge(&bid, &ask, buffer.timeframe())
}

/// Encodes a merged FXT day for storage.
///
/// Every bar must sit in its slot of the day and be valid.
///
/// # Errors
///
/// Returns [`HistoryError::IncompleteSeries`] for a wrong bar count,
/// [`HistoryError::NonContiguousMerge`] for a bar outside its slot and
/// [`HistoryError::InvalidBar`] for an invalid bar.
pub fn save_day(day: FxtDay, bars: &[Bar], timeframe: Timeframe) -> Result<Vec<u8>> {
    let unsupported = || HistoryError::UnsupportedTimeframe {
        timeframe,
        formula: "save".to_string(),
    };
    let interval = timeframe.seconds().ok_or_else(unsupported)?;
    let expected = timeframe.bars_per_day().ok_or_else(unsupported)?;
    if bars.len() != expected {
        return Err(HistoryError::IncompleteSeries {
            series: PriceType::Avg.to_string(),
            actual: bars.len(),
            expected,
        });
    }

    let mut slot = day.start();
    for bar in bars {
        if bar.time != slot {
            return Err(HistoryError::NonContiguousMerge {
                last: slot - interval,
                next: bar.time,
            });
        }
        slot += interval;
    }
    encode_bars(bars)
}

/// State of one symbol's update: the day buffer and the history start cache.
///
/// A run is created per symbol and processes FXT days in ascending order.
#[derive(Debug)]
pub struct UpdateRun<R = Fxt> {
    symbol: String,
    digits: u8,
    buffer: DayBarBuffer,
    history_starts: HistoryStartCache,
    rules: R,
}

impl UpdateRun<Fxt> {
    /// Creates a run for an instrument using the FXT clock.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnsupportedTimeframe`] if the timeframe can't be buffered.
    pub fn new(instrument: &Instrument, timeframe: Timeframe) -> Result<Self> {
        Self::with_rules(instrument, timeframe, Fxt)
    }
}

impl<R: TimezoneRules> UpdateRun<R> {
    /// Creates a run using the given time rules.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnsupportedTimeframe`] if the timeframe can't be buffered.
    pub fn with_rules(instrument: &Instrument, timeframe: Timeframe, rules: R) -> Result<Self> {
        Ok(Self {
            symbol: instrument.symbol().to_string(),
            digits: instrument.digits(),
            buffer: DayBarBuffer::new(timeframe)?,
            history_starts: HistoryStartCache::new(),
            rules,
        })
    }

    /// Returns the symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the day buffer.
    #[must_use]
    pub const fn buffer(&self) -> &DayBarBuffer {
        &self.buffer
    }

    /// Returns the history start cache.
    #[must_use]
    pub const fn history_starts(&self) -> &HistoryStartCache {
        &self.history_starts
    }

    /// Returns the history start cache for updating.
    pub const fn history_starts_mut(&mut self) -> &mut HistoryStartCache {
        &mut self.history_starts
    }

    /// Returns the vendor files needed to complete an FXT day.
    ///
    /// The head of an FXT day comes from the GMT file covering FXT midnight
    /// and the tail from the file covering its last second. With FXT ahead of
    /// GMT these are the previous GMT day and the day itself. A clock behind
    /// GMT takes the day itself and the next one, a clock equal to GMT only
    /// the day itself. Pieces already buffered are not requested again.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::TimeRuleUnavailable`] if the rules don't cover the day.
    pub fn required_files(&self, day: FxtDay) -> Result<Vec<(PriceType, FxtDay)>> {
        let head = FxtDay::of(day.start() - i64::from(self.rules.offset_at(day.start())?));
        let last = day.start() + SECONDS_PER_DAY - 1;
        let tail = FxtDay::of(last - i64::from(self.rules.offset_at(last)?));

        let mut files = Vec::new();
        for price_type in PriceType::quoted() {
            if self.buffer.is_complete(price_type, day) {
                continue;
            }
            let missing_head = !self.buffer.has_head(price_type, day);
            if missing_head {
                files.push((price_type, head));
            }
            if !self.buffer.has_tail(price_type, day) && !(missing_head && tail == head) {
                files.push((price_type, tail));
            }
        }
        Ok(files)
    }

    /// Processes a decompressed vendor file covering the GMT day `day_gmt`.
    ///
    /// # Errors
    ///
    /// See [`process_vendor_day`].
    pub fn process_vendor_day(&mut self, price_type: PriceType, day_gmt: FxtDay, data: &[u8]) -> Result<()> {
        let ctx = DecodeContext::new(&self.symbol, price_type, day_gmt, self.digits);
        process_vendor_day(&mut self.buffer, &self.rules, &ctx, data)
    }

    /// Merges the buffered bid and ask series of an FXT day.
    ///
    /// # Errors
    ///
    /// See [`merge_day`].
    pub fn merge_day(&self, day: FxtDay) -> Result<Vec<Bar>> {
        merge_day(&self.buffer, day)
    }

    /// Encodes a merged day for storage.
    ///
    /// # Errors
    ///
    /// See [`save_day`].
    pub fn save_day(&self, day: FxtDay, bars: &[Bar]) -> Result<Vec<u8>> {
        save_day(day, bars, self.buffer.timeframe())
    }

    /// Releases the buffered data no longer needed after `day`.
    pub fn finish_day(&mut self, day: FxtDay) {
        self.buffer.evict(day);
        self.buffer.evict(day.previous());
        debug!(symbol = %self.symbol, %day, buffered = self.buffer.len(), "day finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosabar_time::TransitionTable;
    use rosabar_types::Category;

    fn instrument() -> Instrument {
        Instrument::new("EURUSD", "Euro vs US Dollar", Category::Forex, 5, None, None)
    }

    #[test]
    fn test_config_default() {
        let config = UpdateConfig::default();
        assert_eq!(config.timeframe, Timeframe::Minute1);
        assert!(!config.keep_downloads);
    }

    #[test]
    fn test_required_files_empty_buffer() {
        let run = UpdateRun::new(&instrument(), Timeframe::Minute1).unwrap();
        // Tue, 09-Jan-2024
        let day = FxtDay::of(1_704_758_400);
        assert_eq!(
            run.required_files(day).unwrap(),
            vec![
                (PriceType::Bid, day.previous()),
                (PriceType::Bid, day),
                (PriceType::Ask, day.previous()),
                (PriceType::Ask, day),
            ]
        );
    }

    #[test]
    fn test_required_files_follow_offset_sign() {
        let day = FxtDay::of(1_704_758_400);

        let behind = UpdateRun::with_rules(&instrument(), Timeframe::Minute1, TransitionTable::fixed(-3600)).unwrap();
        assert_eq!(
            behind.required_files(day).unwrap(),
            vec![
                (PriceType::Bid, day),
                (PriceType::Bid, day.next()),
                (PriceType::Ask, day),
                (PriceType::Ask, day.next()),
            ]
        );

        let gmt = UpdateRun::with_rules(&instrument(), Timeframe::Minute1, TransitionTable::fixed(0)).unwrap();
        assert_eq!(
            gmt.required_files(day).unwrap(),
            vec![(PriceType::Bid, day), (PriceType::Ask, day)]
        );
    }

    #[test]
    fn test_negative_offset_completes_day() {
        let mut run =
            UpdateRun::with_rules(&instrument(), Timeframe::Minute1, TransitionTable::fixed(-3600)).unwrap();
        let day = FxtDay::of(1_704_758_400);
        for (price_type, day_gmt) in run.required_files(day).unwrap() {
            let data: Vec<u8> = (0..1440u32)
                .flat_map(|i| {
                    let mut bytes = [0u8; 24];
                    bytes[0..4].copy_from_slice(&(i * 60).to_be_bytes());
                    for field in bytes[4..20].chunks_exact_mut(4) {
                        field.copy_from_slice(&100_000u32.to_be_bytes());
                    }
                    bytes[20..24].copy_from_slice(&1.0f32.to_be_bytes());
                    bytes
                })
                .collect();
            run.process_vendor_day(price_type, day_gmt, &data).unwrap();
        }
        let bars = run.merge_day(day).unwrap();
        assert_eq!(bars.len(), 1440);
        assert_eq!(bars[0].time, day.start());
        assert!(run.save_day(day, &bars).is_ok());
    }

    #[test]
    fn test_save_day_checks_slots() {
        let day = FxtDay::of(1_704_758_400);
        let mut bars: Vec<Bar> = (0..1440)
            .map(|i| Bar::new(day.start() + i * 60, 10, 11, 9, 10, 4))
            .collect();
        assert_eq!(save_day(day, &bars, Timeframe::Minute1).unwrap().len(), 1440 * 24);

        bars[10].time += 30;
        assert!(matches!(
            save_day(day, &bars, Timeframe::Minute1),
            Err(HistoryError::NonContiguousMerge { .. })
        ));
        bars.truncate(100);
        assert!(matches!(
            save_day(day, &bars, Timeframe::Minute1),
            Err(HistoryError::IncompleteSeries { actual: 100, .. })
        ));
    }

    #[test]
    fn test_merge_day_incomplete() {
        let run = UpdateRun::new(&instrument(), Timeframe::Minute1).unwrap();
        assert!(matches!(
            run.merge_day(FxtDay::of(1_704_758_400)),
            Err(HistoryError::IncompleteSeries { actual: 0, .. })
        ));
    }
}
