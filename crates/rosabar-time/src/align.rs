//! Attaching GMT and FXT times to vendor bars.

use rosabar_types::{AlignedBar, RawBar, Result, SECONDS_PER_DAY};
use tracing::debug;

use crate::{Fxt, TimezoneRules, Transition};

/// Converts a GMT timestamp to local time.
///
/// Returns the local timestamp and the offset applied.
///
/// # Errors
///
/// Returns [`rosabar_types::HistoryError::TimeRuleUnavailable`] if the rules
/// don't cover the instant.
pub fn to_local_time<R: TimezoneRules>(gmt: i64, rules: &R) -> Result<(i64, i32)> {
    let offset = rules.offset_at(gmt)?;
    Ok((gmt + i64::from(offset), offset))
}

/// Aligns a daily timestamp to midnight.
#[must_use]
pub const fn align_daily(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(SECONDS_PER_DAY)
}

/// Converts a GMT timestamp in milliseconds to FXT milliseconds.
///
/// # Errors
///
/// Returns [`rosabar_types::HistoryError::TimeRuleUnavailable`] if the
/// timestamp is out of range.
pub fn fxt_time(gmt_millis: i64) -> Result<i64> {
    let offset = Fxt.offset_at(gmt_millis.div_euclid(1000))?;
    Ok(gmt_millis + i64::from(offset) * 1000)
}

/// The bars of one vendor file with GMT and FXT times attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDay {
    /// Start of the file's GMT day.
    pub day_gmt: i64,
    /// The aligned bars in file order.
    pub bars: Vec<AlignedBar>,
    /// The offset transition applied to the bars, if the offset switched within the file.
    pub transition: Option<Transition>,
}

impl AlignedDay {
    /// Returns true if the bars use two different offsets.
    #[must_use]
    pub const fn switched(&self) -> bool {
        self.transition.is_some()
    }

    /// Returns the index of the first bar starting an FXT day, if any.
    #[must_use]
    pub fn split_index(&self) -> Option<usize> {
        self.bars.iter().position(|b| b.delta_fxt == 0)
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if the file held no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Attaches GMT and FXT times to the bars of a vendor file.
///
/// `day_gmt` is the start of the GMT day the file covers and each bar's
/// `time_delta` is added to it. The offset is taken at the start of the day
/// and switches exactly at a transition inside the day, so bars before the
/// transition keep the old offset and bars at or after it use the new one.
///
/// # Errors
///
/// Returns [`rosabar_types::HistoryError::TimeRuleUnavailable`] if the rules
/// don't cover the day.
pub fn align_bars<R: TimezoneRules>(day_gmt: i64, bars: Vec<RawBar>, rules: &R) -> Result<AlignedDay> {
    let mut offset = i64::from(rules.offset_at(day_gmt)?);
    let transition = rules.transition_within(day_gmt, SECONDS_PER_DAY)?;
    let mut applied = None;

    let aligned = bars
        .into_iter()
        .map(|bar| {
            let time_gmt = day_gmt + i64::from(bar.time_delta);
            if let Some(t) = transition.filter(|t| applied.is_none() && time_gmt >= t.instant) {
                debug!(instant = t.instant, offset = t.offset, "FXT offset switch");
                offset = i64::from(t.offset);
                applied = Some(t);
            }
            let time_fxt = time_gmt + offset;
            AlignedBar {
                bar,
                time_gmt,
                delta_gmt: time_gmt - day_gmt,
                time_fxt,
                delta_fxt: time_fxt.rem_euclid(SECONDS_PER_DAY),
            }
        })
        .collect();

    Ok(AlignedDay {
        day_gmt,
        bars: aligned,
        transition: applied,
    })
}
