//! Timezone offset rules.

use chrono::{DateTime, Offset};
use chrono_tz::America::New_York;
use rosabar_types::{HistoryError, Result};

/// Offset of FXT from New York time in seconds.
const FXT_SHIFT: i32 = 7 * 3600;

/// A change of the UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// First GMT second the new offset applies to.
    pub instant: i64,
    /// Offset in seconds valid from `instant` on.
    pub offset: i32,
}

/// A source of UTC offsets for a local clock.
pub trait TimezoneRules {
    /// Returns the offset in seconds of the local clock at the given GMT time.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::TimeRuleUnavailable`] if no rule covers the instant.
    fn offset_at(&self, gmt: i64) -> Result<i32>;

    /// Returns the offset transition within `[gmt, gmt + span)`, if any.
    ///
    /// At most one transition is reported. The default implementation searches
    /// the span for the first second whose offset differs from the offset at
    /// `gmt`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::TimeRuleUnavailable`] if no rule covers the span.
    fn transition_within(&self, gmt: i64, span: i64) -> Result<Option<Transition>> {
        if span <= 1 {
            return Ok(None);
        }
        let initial = self.offset_at(gmt)?;
        let mut hi = gmt + span - 1;
        if self.offset_at(hi)? == initial {
            return Ok(None);
        }
        let mut lo = gmt;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.offset_at(mid)? == initial {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(Some(Transition {
            instant: hi,
            offset: self.offset_at(hi)?,
        }))
    }
}

impl<T: TimezoneRules + ?Sized> TimezoneRules for &T {
    fn offset_at(&self, gmt: i64) -> Result<i32> {
        (**self).offset_at(gmt)
    }

    fn transition_within(&self, gmt: i64, span: i64) -> Result<Option<Transition>> {
        (**self).transition_within(gmt, span)
    }
}

/// The FXT clock: New York time plus seven hours.
///
/// An FXT day starts at 17:00 New York time, the daily rollover of the forex
/// market. Offsets follow the US DST rules from the IANA database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fxt;

impl TimezoneRules for Fxt {
    fn offset_at(&self, gmt: i64) -> Result<i32> {
        let utc = DateTime::from_timestamp(gmt, 0)
            .ok_or(HistoryError::TimeRuleUnavailable { timestamp: gmt })?;
        let local = utc.with_timezone(&New_York);
        Ok(local.offset().fix().local_minus_utc() + FXT_SHIFT)
    }
}

/// A fixed list of offset rules.
///
/// Each rule applies from its instant until the next one. Instants before
/// the first rule have no offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    rules: Vec<Transition>,
}

impl TransitionTable {
    /// Creates a table from the given rules in any order.
    #[must_use]
    pub fn new(mut rules: Vec<Transition>) -> Self {
        rules.sort_by_key(|t| t.instant);
        Self { rules }
    }

    /// Creates a table with a single offset valid at all times.
    #[must_use]
    pub fn fixed(offset: i32) -> Self {
        Self::new(vec![Transition {
            instant: i64::MIN,
            offset,
        }])
    }

    /// Returns the rules sorted by instant.
    #[must_use]
    pub fn rules(&self) -> &[Transition] {
        &self.rules
    }
}

impl TimezoneRules for TransitionTable {
    fn offset_at(&self, gmt: i64) -> Result<i32> {
        let idx = self.rules.partition_point(|t| t.instant <= gmt);
        if idx == 0 {
            return Err(HistoryError::TimeRuleUnavailable { timestamp: gmt });
        }
        Ok(self.rules[idx - 1].offset)
    }

    fn transition_within(&self, gmt: i64, span: i64) -> Result<Option<Transition>> {
        let initial = self.offset_at(gmt)?;
        let end = gmt.saturating_add(span);
        Ok(self
            .rules
            .iter()
            .skip_while(|t| t.instant <= gmt)
            .take_while(|t| t.instant < end)
            .find(|t| t.offset != initial)
            .copied())
    }
}
