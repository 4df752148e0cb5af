//! Dukascopy history start stream decoding.
//!
//! The stream lists, per symbol, the earliest available data of each
//! timeframe. A symbol section looks like this:
//!
//! | Size       | Field                                   |
//! |------------|-----------------------------------------|
//! | `u8`       | start flag, always 0                    |
//! | `u8`       | length of the symbol name               |
//! | `[u8; n]`  | symbol name (ASCII)                     |
//! | `u32` BE   | high word of the field count, always 0  |
//! | `u32` BE   | field count, always 4                   |
//! | 16 × count | entries of two `u64` BE                 |
//!
//! An entry holds the timeframe length in milliseconds (`u64::MAX` for tick
//! data) and the history start in milliseconds since the epoch (`i64::MAX`
//! if no history is available).

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder};
use rosabar_time::fxt_time;
use rosabar_types::{HistoryError, Result, Timeframe};

/// Size in bytes of a history start entry.
const ENTRY_SIZE: usize = 16;

/// Field count every symbol section carries.
const FIELD_COUNT: u32 = 4;

/// Timeframe identifier used for tick data.
const TICK_TIMEFRAME: u64 = u64::MAX;

/// Start value used for "no history available".
const NO_HISTORY: i64 = i64::MAX;

const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Earliest available history of one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistoryStart {
    /// The timeframe.
    pub timeframe: Timeframe,
    /// FXT time of the first available data in milliseconds.
    ///
    /// Daily history starts at midnight and is not converted.
    pub start: i64,
}

impl HistoryStart {
    /// Returns the start in FXT seconds.
    #[must_use]
    pub const fn start_seconds(&self) -> i64 {
        self.start.div_euclid(1000)
    }
}

/// Decodes the history start stream of all symbols.
///
/// Symbols without any available history are omitted. Symbol names are
/// upper-cased, entries are sorted by timeframe.
///
/// # Errors
///
/// Returns [`HistoryError::MalformedHistoryStart`] on unexpected headers,
/// truncated data or invalid entries.
pub fn decode_history_starts(data: &[u8]) -> Result<BTreeMap<String, Vec<HistoryStart>>> {
    if data.is_empty() {
        return Err(malformed(0, "empty history start data"));
    }

    let mut symbols = BTreeMap::new();
    let mut offset = 0;

    while offset < data.len() {
        let header = slice(data, offset, 2)?;
        if header[0] != 0 {
            return Err(malformed(offset, format!("start={}", header[0])));
        }
        let length = usize::from(header[1]);
        offset += 2;

        let name = slice(data, offset, length)?;
        if !name.is_ascii() {
            return Err(malformed(offset, "non-ASCII symbol name"));
        }
        let symbol = String::from_utf8_lossy(name).to_uppercase();
        offset += length;

        let counts = slice(data, offset, 8)?;
        let high = BigEndian::read_u32(&counts[0..4]);
        if high != 0 {
            return Err(malformed(offset, format!("high={high}")));
        }
        let count = BigEndian::read_u32(&counts[4..8]);
        if count != FIELD_COUNT {
            return Err(malformed(offset + 4, format!("count={count}")));
        }
        offset += 8;

        let count = count as usize;
        let section = slice(data, offset, count * ENTRY_SIZE)?;
        let starts = read_section(section, offset, count)?;
        if !starts.is_empty() {
            symbols.insert(symbol, starts);
        }
        offset += count * ENTRY_SIZE;
    }

    Ok(symbols)
}

/// Decodes a single symbol's history start section.
///
/// This is the content of a symbol's own history start file: consecutive
/// entries without header. With `count` set, only that many entries are read.
///
/// # Errors
///
/// Returns [`HistoryError::MalformedHistoryStart`] if the data is empty, not
/// a whole number of entries, or holds an invalid entry.
pub fn decode_history_start_section(data: &[u8], count: Option<usize>) -> Result<Vec<HistoryStart>> {
    if data.is_empty() {
        return Err(malformed(0, "empty history start data"));
    }
    let count = match count {
        Some(count) => count,
        None if data.len().is_multiple_of(ENTRY_SIZE) => data.len() / ENTRY_SIZE,
        None => {
            return Err(malformed(
                0,
                format!("{} bytes is not a whole number of entries", data.len()),
            ));
        }
    };
    if count == 0 {
        return Err(malformed(0, "no entries requested"));
    }
    let section = slice(data, 0, count * ENTRY_SIZE)?;
    read_section(section, 0, count)
}

/// Reads `count` entries, dropping timeframes without history.
///
/// The first entry of a timeframe wins.
fn read_section(section: &[u8], base: usize, count: usize) -> Result<Vec<HistoryStart>> {
    let mut starts = BTreeMap::new();
    for (i, entry) in section.chunks_exact(ENTRY_SIZE).take(count).enumerate() {
        if let Some(start) = read_entry(entry, base + i * ENTRY_SIZE)? {
            starts.entry(start.timeframe).or_insert(start);
        }
    }
    Ok(starts.into_values().collect())
}

fn read_entry(entry: &[u8], offset: usize) -> Result<Option<HistoryStart>> {
    let mut raw_timeframe = BigEndian::read_u64(&entry[0..8]);
    let raw_start = BigEndian::read_u64(&entry[8..16]);

    if raw_timeframe == TICK_TIMEFRAME {
        raw_timeframe = 0;
    }
    let timeframe = Some(raw_timeframe)
        .filter(|ms| ms % MILLIS_PER_MINUTE == 0)
        .and_then(|ms| Timeframe::from_minutes(ms / MILLIS_PER_MINUTE))
        .ok_or_else(|| malformed(offset, format!("unexpected timeframe identifier {raw_timeframe}")))?;

    let start = i64::try_from(raw_start)
        .map_err(|_| malformed(offset + 8, format!("invalid timestamp {raw_start} (out of range)")))?;
    if start == NO_HISTORY {
        return Ok(None);
    }

    let start = if timeframe == Timeframe::Day1 {
        start - start.rem_euclid(MILLIS_PER_DAY)
    } else {
        fxt_time(start)?
    };
    Ok(Some(HistoryStart { timeframe, start }))
}

fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset + len)
        .ok_or_else(|| malformed(offset, format!("truncated, expected {len} more bytes")))
}

fn malformed(offset: usize, reason: impl Into<String>) -> HistoryError {
    HistoryError::MalformedHistoryStart {
        offset,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mon, 04-Aug-2003 10:03:00 GMT
    const M1_START: u64 = 1_059_991_380_000;

    fn entry(timeframe: u64, start: u64) -> Vec<u8> {
        let mut bytes = vec![0u8; 16];
        BigEndian::write_u64(&mut bytes[0..8], timeframe);
        BigEndian::write_u64(&mut bytes[8..16], start);
        bytes
    }

    fn section(symbol: &str, entries: &[(u64, u64)]) -> Vec<u8> {
        let mut bytes = vec![0u8, symbol.len() as u8];
        bytes.extend(symbol.as_bytes());
        bytes.extend(0u32.to_be_bytes());
        bytes.extend((entries.len() as u32).to_be_bytes());
        for (tf, start) in entries {
            bytes.extend(entry(*tf, *start));
        }
        bytes
    }

    fn eurusd_entries() -> Vec<(u64, u64)> {
        vec![
            (u64::MAX, M1_START + 2837),
            (60_000, M1_START),
            (3_600_000, i64::MAX as u64),
            (86_400_000, 691_027_200_000 + 3_600_000),
        ]
    }

    #[test]
    fn test_decode_section() {
        let data: Vec<u8> = eurusd_entries()
            .into_iter()
            .flat_map(|(tf, start)| entry(tf, start))
            .collect();
        let starts = decode_history_start_section(&data, None).unwrap();

        assert_eq!(starts.len(), 3);
        assert_eq!(starts[0].timeframe, Timeframe::Tick);
        assert_eq!(starts[0].start, M1_START as i64 + 2837 + 10_800_000);
        assert_eq!(starts[1].timeframe, Timeframe::Minute1);
        // EDT: FXT = GMT+3
        assert_eq!(starts[1].start_seconds(), 1_059_991_380 + 10_800);
        assert_eq!(starts[2].timeframe, Timeframe::Day1);
        // Mon, 25-Nov-1991 00:00:00
        assert_eq!(starts[2].start, 691_027_200_000);
        assert!(starts.iter().all(|s| s.timeframe != Timeframe::Hour1));
    }

    #[test]
    fn test_decode_all_symbols() {
        let mut data = section("eurusd", &eurusd_entries());
        data.extend(section(
            "xyzabc",
            &[
                (u64::MAX, i64::MAX as u64),
                (60_000, i64::MAX as u64),
                (3_600_000, i64::MAX as u64),
                (86_400_000, i64::MAX as u64),
            ],
        ));
        data.extend(section("audusd", &eurusd_entries()));

        let symbols = decode_history_starts(&data).unwrap();
        let names: Vec<_> = symbols.keys().map(String::as_str).collect();
        assert_eq!(names, ["AUDUSD", "EURUSD"]);
        assert_eq!(symbols["EURUSD"].len(), 3);
    }

    #[test]
    fn test_unknown_timeframe() {
        let data = entry(7 * 60_000, M1_START);
        assert!(matches!(
            decode_history_start_section(&data, None),
            Err(HistoryError::MalformedHistoryStart { offset: 0, .. })
        ));
        let data = entry(1000, M1_START);
        assert!(decode_history_start_section(&data, None).is_err());
    }

    #[test]
    fn test_negative_start() {
        let data = entry(60_000, u64::MAX);
        assert!(matches!(
            decode_history_start_section(&data, None),
            Err(HistoryError::MalformedHistoryStart { offset: 8, .. })
        ));
    }

    #[test]
    fn test_bad_headers() {
        let mut data = section("eurusd", &eurusd_entries());
        data[0] = 1;
        assert!(decode_history_starts(&data).is_err());

        let mut data = section("eurusd", &eurusd_entries()[..3]);
        assert!(matches!(
            decode_history_starts(&data),
            Err(HistoryError::MalformedHistoryStart { offset: 12, .. })
        ));

        data = section("eurusd", &eurusd_entries());
        data.truncate(data.len() - 1);
        assert!(decode_history_starts(&data).is_err());
        assert!(decode_history_starts(&[]).is_err());
    }

    #[test]
    fn test_section_count() {
        let data: Vec<u8> = eurusd_entries()
            .into_iter()
            .flat_map(|(tf, start)| entry(tf, start))
            .collect();
        let starts = decode_history_start_section(&data, Some(1)).unwrap();
        assert_eq!(starts.len(), 1);
        assert!(decode_history_start_section(&data[..20], None).is_err());
    }
}
