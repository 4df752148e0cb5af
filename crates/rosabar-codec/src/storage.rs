//! The local stored bar format.
//!
//! Each bar is 24 bytes: six little-endian `u32` fields in the order
//! `time, open, high, low, close, ticks`. Prices are in points.

use byteorder::{ByteOrder, LittleEndian};
use rosabar_types::{Bar, HistoryError, Result};

/// Encodes bars into the stored bar format.
///
/// # Errors
///
/// Returns [`HistoryError::InvalidBar`] for a bar violating the OHLC/ticks
/// invariant or whose time doesn't fit the 32-bit time field.
pub fn encode_bars(bars: &[Bar]) -> Result<Vec<u8>> {
    let mut data = vec![0u8; bars.len() * Bar::SIZE];
    for (bar, chunk) in bars.iter().zip(data.chunks_exact_mut(Bar::SIZE)) {
        bar.validate()?;
        let time = u32::try_from(bar.time).map_err(|_| invalid_bar(bar))?;
        LittleEndian::write_u32(&mut chunk[0..4], time);
        LittleEndian::write_u32(&mut chunk[4..8], bar.open);
        LittleEndian::write_u32(&mut chunk[8..12], bar.high);
        LittleEndian::write_u32(&mut chunk[12..16], bar.low);
        LittleEndian::write_u32(&mut chunk[16..20], bar.close);
        LittleEndian::write_u32(&mut chunk[20..24], bar.ticks);
    }
    Ok(data)
}

const fn invalid_bar(bar: &Bar) -> HistoryError {
    HistoryError::InvalidBar {
        time: bar.time,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        ticks: bar.ticks,
    }
}

/// Decodes bars from the stored bar format.
///
/// # Errors
///
/// Returns [`HistoryError::MalformedData`] if the length is not a multiple of
/// [`Bar::SIZE`].
pub fn read_stored_bars(data: &[u8]) -> Result<Vec<Bar>> {
    if !data.len().is_multiple_of(Bar::SIZE) {
        return Err(HistoryError::MalformedData {
            len: data.len(),
            record_size: Bar::SIZE,
        });
    }

    Ok(data
        .chunks_exact(Bar::SIZE)
        .map(|chunk| {
            Bar::new(
                i64::from(LittleEndian::read_u32(&chunk[0..4])),
                LittleEndian::read_u32(&chunk[4..8]),
                LittleEndian::read_u32(&chunk[8..12]),
                LittleEndian::read_u32(&chunk[12..16]),
                LittleEndian::read_u32(&chunk[16..20]),
                LittleEndian::read_u32(&chunk[20..24]),
            )
        })
        .collect())
}

/// Returns the number of stored bars in a buffer of the given length.
#[must_use]
pub const fn stored_bar_count(data_len: usize) -> usize {
    data_len / Bar::SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars() -> Vec<Bar> {
        vec![
            Bar::new(1_710_115_200, 112_345, 112_360, 112_340, 112_350, 35),
            Bar::new(1_710_115_260, 112_350, 112_355, 112_320, 112_330, 50),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let data = encode_bars(&sample_bars()).unwrap();
        assert_eq!(data.len(), 48);
        assert_eq!(LittleEndian::read_u32(&data[0..4]), 1_710_115_200);
        assert_eq!(LittleEndian::read_u32(&data[8..12]), 112_360);
        assert_eq!(LittleEndian::read_u32(&data[44..48]), 50);
    }

    #[test]
    fn test_stored_round_trip() {
        let bars = sample_bars();
        let data = encode_bars(&bars).unwrap();
        let decoded = read_stored_bars(&data).unwrap();
        assert_eq!(decoded, bars);
        assert_eq!(encode_bars(&decoded).unwrap(), data);
        assert_eq!(stored_bar_count(data.len()), 2);
    }

    #[test]
    fn test_encode_rejects_invalid_bar() {
        let bars = [Bar::new(60, 100, 110, 90, 105, 0)];
        assert!(matches!(
            encode_bars(&bars),
            Err(HistoryError::InvalidBar { time: 60, ticks: 0, .. })
        ));

        let bars = [Bar::new(-60, 100, 110, 90, 105, 1)];
        assert!(matches!(
            encode_bars(&bars),
            Err(HistoryError::InvalidBar { time: -60, .. })
        ));
    }

    #[test]
    fn test_read_stored_invalid_length() {
        assert!(matches!(
            read_stored_bars(&[0u8; 25]),
            Err(HistoryError::MalformedData { len: 25, record_size: 24 })
        ));
        assert!(read_stored_bars(&[]).unwrap().is_empty());
    }
}
