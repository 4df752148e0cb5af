//! Trading days and day ranges.
//!
//! FXT timestamps are stored as seconds since the epoch of the FXT wall clock,
//! i.e. an FXT midnight is always a multiple of [`SECONDS_PER_DAY`].

use chrono::{DateTime, Datelike, NaiveDate, Weekday};

use crate::DateRangeError;

/// Number of seconds in a day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A calendar day, stored as the number of days since 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FxtDay(i64);

impl FxtDay {
    /// Creates a day from its index (days since 1970-01-01).
    #[must_use]
    pub const fn from_index(index: i64) -> Self {
        Self(index)
    }

    /// Returns the day containing the given timestamp.
    #[must_use]
    pub const fn of(timestamp: i64) -> Self {
        Self(timestamp.div_euclid(SECONDS_PER_DAY))
    }

    /// Returns the day of the given calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self::of(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
    }

    /// Returns the day index.
    #[must_use]
    pub const fn index(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp of 00:00 of this day.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.0 * SECONDS_PER_DAY
    }

    /// Returns the previous day.
    #[must_use]
    pub const fn previous(&self) -> Self {
        Self(self.0 - 1)
    }

    /// Returns the next day.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the calendar date, if representable.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.start(), 0).map(|dt| dt.date_naive())
    }

    /// Returns the weekday.
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        // 1970-01-01 was a Thursday
        match self.0.rem_euclid(7) {
            0 => Weekday::Thu,
            1 => Weekday::Fri,
            2 => Weekday::Sat,
            3 => Weekday::Sun,
            4 => Weekday::Mon,
            5 => Weekday::Tue,
            _ => Weekday::Wed,
        }
    }

    /// Returns true for Saturdays and Sundays.
    #[must_use]
    pub const fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl std::fmt::Display for FxtDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date() {
            Some(date) => write!(f, "{}", date.format("%a, %d-%b-%Y")),
            None => write!(f, "day #{}", self.0),
        }
    }
}

/// A range of dates for history processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns an iterator over all days in the range, in ascending order.
    #[must_use]
    pub fn days(&self) -> DayIterator {
        DayIterator {
            current: FxtDay::from_date(self.start),
            end: FxtDay::from_date(self.end),
        }
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns the number of Monday-to-Friday days in the range.
    #[must_use]
    pub fn weekdays(&self) -> usize {
        self.days().filter(|d| !d.is_weekend()).count()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over all days in a date range.
#[derive(Debug, Clone)]
pub struct DayIterator {
    current: FxtDay,
    end: FxtDay,
}

impl Iterator for DayIterator {
    type Item = FxtDay;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.end {
            return None;
        }
        let result = self.current;
        self.current = self.current.next();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let days = (self.end.index() - self.current.index() + 1).max(0) as usize;
        (days, Some(days))
    }
}

impl ExactSizeIterator for DayIterator {}
