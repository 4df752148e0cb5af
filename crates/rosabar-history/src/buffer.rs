//! Accumulation of vendor files into FXT days.

use std::collections::HashMap;

use rosabar_time::AlignedDay;
use rosabar_types::{AlignedBar, FxtDay, HistoryError, PriceType, Result, SECONDS_PER_DAY, Timeframe};
use tracing::{debug, warn};

/// Bars of one or more vendor files, grouped by price type and FXT day.
///
/// A vendor file covers a GMT day and therefore spans two FXT days. Each
/// appended file is split at FXT midnight and the pieces are joined with the
/// data already buffered for their day. Entries must be evicted explicitly
/// once a day has been consumed.
#[derive(Debug)]
pub struct DayBarBuffer {
    timeframe: Timeframe,
    interval: i64,
    bars_per_day: usize,
    entries: HashMap<(PriceType, FxtDay), Vec<AlignedBar>>,
}

impl DayBarBuffer {
    /// Creates an empty buffer for the given timeframe.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnsupportedTimeframe`] for timeframes that
    /// don't divide a day into whole bars.
    pub fn new(timeframe: Timeframe) -> Result<Self> {
        let unsupported = || HistoryError::UnsupportedTimeframe {
            timeframe,
            formula: "day buffer".to_string(),
        };
        let interval = timeframe.seconds().ok_or_else(unsupported)?;
        let bars_per_day = timeframe.bars_per_day().ok_or_else(unsupported)?;
        Ok(Self {
            timeframe,
            interval,
            bars_per_day,
            entries: HashMap::new(),
        })
    }

    /// Returns the buffered timeframe.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Returns the number of bars of a complete day.
    #[must_use]
    pub const fn bars_per_day(&self) -> usize {
        self.bars_per_day
    }

    /// Appends an aligned vendor file.
    ///
    /// Bars before the first FXT midnight are the tail of the first bar's FXT
    /// day, bars from the midnight on are the head of the next day.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NonContiguousMerge`] if a piece doesn't start
    /// exactly one interval after the bars buffered for its day. The buffer
    /// is left unchanged in that case.
    pub fn append(&mut self, price_type: PriceType, day: AlignedDay) -> Result<()> {
        if day.is_empty() {
            return Ok(());
        }
        let split = day.split_index().unwrap_or(day.len());
        if day.switched() && split > 0 && split < day.len() {
            check_dst_boundary(price_type, &day.bars[split - 1], &day.bars[split]);
        }

        let mut tail = day.bars;
        let head = tail.split_off(split);
        for piece in [&tail, &head] {
            if let Some(first) = piece.first() {
                self.check_contiguous(price_type, first)?;
            }
        }
        for piece in [tail, head] {
            self.push(price_type, piece);
        }
        Ok(())
    }

    fn check_contiguous(&self, price_type: PriceType, first: &AlignedBar) -> Result<()> {
        let key = (price_type, FxtDay::of(first.time_fxt));
        match self.entries.get(&key).and_then(|bars| bars.last()) {
            Some(last) if last.time_fxt + self.interval != first.time_fxt => {
                Err(HistoryError::NonContiguousMerge {
                    last: last.time_fxt,
                    next: first.time_fxt,
                })
            }
            _ => Ok(()),
        }
    }

    fn push(&mut self, price_type: PriceType, piece: Vec<AlignedBar>) {
        let Some(first) = piece.first() else {
            return;
        };
        let day = FxtDay::of(first.time_fxt);
        debug!(%price_type, %day, bars = piece.len(), "buffering bars");
        let capacity = self.bars_per_day;
        self.entries
            .entry((price_type, day))
            .or_insert_with(|| Vec::with_capacity(capacity))
            .extend(piece);
    }

    /// Returns the bars buffered for a day.
    #[must_use]
    pub fn get(&self, price_type: PriceType, day: FxtDay) -> Option<&[AlignedBar]> {
        self.entries.get(&(price_type, day)).map(Vec::as_slice)
    }

    /// Returns true if the buffered day starts at FXT midnight.
    #[must_use]
    pub fn has_head(&self, price_type: PriceType, day: FxtDay) -> bool {
        self.get(price_type, day)
            .and_then(<[_]>::first)
            .is_some_and(|b| b.delta_fxt == 0)
    }

    /// Returns true if the buffered day ends with the last slot of the day.
    #[must_use]
    pub fn has_tail(&self, price_type: PriceType, day: FxtDay) -> bool {
        self.get(price_type, day)
            .and_then(<[_]>::last)
            .is_some_and(|b| b.delta_fxt == SECONDS_PER_DAY - self.interval)
    }

    /// Returns true if a full day is buffered.
    ///
    /// The count alone is not sufficient: the day must also start at midnight
    /// and end with the last slot.
    #[must_use]
    pub fn is_complete(&self, price_type: PriceType, day: FxtDay) -> bool {
        self.get(price_type, day)
            .is_some_and(|bars| bars.len() == self.bars_per_day)
            && self.has_head(price_type, day)
            && self.has_tail(price_type, day)
    }

    /// Removes and returns the bars buffered for a day.
    pub fn take(&mut self, price_type: PriceType, day: FxtDay) -> Option<Vec<AlignedBar>> {
        self.entries.remove(&(price_type, day))
    }

    /// Drops everything buffered for a day.
    pub fn evict(&mut self, day: FxtDay) {
        for price_type in [PriceType::Bid, PriceType::Ask, PriceType::Avg] {
            self.entries.remove(&(price_type, day));
        }
    }

    /// Returns the number of buffered (price type, day) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears the buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Warns if the bar closing an FXT day at a DST switch carries volume.
///
/// After a switch the day boundary moves by one hour. A pre-midnight bar
/// with volume hints at data recorded with the wrong offset. Returns true if
/// the warning was logged.
fn check_dst_boundary(price_type: PriceType, last: &AlignedBar, first: &AlignedBar) -> bool {
    let suspicious = last.bar.lots != 0.0;
    if suspicious {
        warn!(
            %price_type,
            day_of_change = %FxtDay::of(last.time_fxt),
            last_time = last.time_fxt,
            last_lots = last.bar.lots,
            first_time = first.time_fxt,
            first_lots = first.bar.lots,
            "lots mismatch during DST change"
        );
    }
    suspicious
}
