//! Error types for rosabar.

use chrono::NaiveDate;
use thiserror::Error;

use crate::Timeframe;

/// Result type alias for rosabar operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Errors that can occur while decoding, aligning, merging or composing bar history.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Byte length is not a whole number of fixed-size records.
    #[error("Malformed data: {len} bytes (expected a non-zero multiple of {record_size})")]
    MalformedData {
        /// Length of the rejected buffer.
        len: usize,
        /// Expected record size in bytes.
        record_size: usize,
    },

    /// Unexpected content in a history start stream.
    #[error("Malformed history start data at offset {offset}: {reason}")]
    MalformedHistoryStart {
        /// Byte offset of the offending field.
        offset: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A bar violates the OHLC/ticks invariant.
    #[error("Illegal bar data at {time}: O={open} H={high} L={low} C={close} V={ticks}")]
    InvalidBar {
        /// Bar open time.
        time: i64,
        /// Open in points.
        open: u32,
        /// High in points.
        high: u32,
        /// Low in points.
        low: u32,
        /// Close in points.
        close: u32,
        /// Tick volume.
        ticks: u32,
    },

    /// A slice does not start exactly one interval after the buffered data.
    #[error("Bar time mismatch, bars to merge: last={last}, next={next}")]
    NonContiguousMerge {
        /// Time of the last buffered bar.
        last: i64,
        /// Time of the first bar to append.
        next: i64,
    },

    /// A series does not hold the expected number of bars.
    #[error(
        "Unexpected number of {series} bars: {actual} ({} than {expected})",
        relation(.actual, .expected)
    )]
    IncompleteSeries {
        /// Which series is affected (e.g. "bid", "ask", "AUDUSD").
        series: String,
        /// Number of bars found.
        actual: usize,
        /// Number of bars required.
        expected: usize,
    },

    /// No timezone rule covers the requested instant.
    #[error("No timezone rule available for timestamp {timestamp}")]
    TimeRuleUnavailable {
        /// The GMT timestamp that could not be resolved.
        timestamp: i64,
    },

    /// A synthetic computation was requested for a timeframe without implementation.
    #[error("{formula}: calculation for timeframe {timeframe} not implemented")]
    UnsupportedTimeframe {
        /// The requested timeframe.
        timeframe: Timeframe,
        /// The formula identifier.
        formula: String,
    },

    /// Instrument or formula not found.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// LZMA decompression failed.
    #[error("Decompression error: {0}")]
    Decompress(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const fn relation(actual: &usize, expected: &usize) -> &'static str {
    if *actual > *expected { "more" } else { "less" }
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
