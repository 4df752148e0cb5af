//! Dukascopy candle and tick record decoding.

use byteorder::{BigEndian, ByteOrder};
use rosabar_types::{FxtDay, HistoryError, PriceType, RawBar, RawTick, Result};
use tracing::warn;

/// Metadata describing the origin of a candle file, used in data-quality warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext<'a> {
    /// Symbol name.
    pub symbol: &'a str,
    /// Price series of the file.
    pub price_type: PriceType,
    /// GMT day covered by the file.
    pub day: FxtDay,
    /// Quote digits of the symbol.
    pub digits: u8,
}

impl<'a> DecodeContext<'a> {
    /// Creates a new decode context.
    #[must_use]
    pub const fn new(symbol: &'a str, price_type: PriceType, day: FxtDay, digits: u8) -> Self {
        Self {
            symbol,
            price_type,
            day,
            digits,
        }
    }

    fn format_points(&self, points: u32) -> String {
        let point = 10f64.powi(-i32::from(self.digits));
        format!("{:.*}", usize::from(self.digits), f64::from(points) * point)
    }
}

impl Default for DecodeContext<'static> {
    fn default() -> Self {
        Self::new("?", PriceType::Bid, FxtDay::from_index(0), 0)
    }
}

/// Result of decoding a candle file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBars {
    /// The decoded records in file order.
    pub bars: Vec<RawBar>,
    /// Number of records whose high/low had to be repaired.
    pub repaired: usize,
}

/// Decodes Dukascopy candle records.
///
/// See [`decode_bars_checked`].
///
/// # Errors
///
/// Returns [`HistoryError::MalformedData`] if the buffer is empty or not a
/// multiple of [`RawBar::SIZE`].
pub fn decode_bars(data: &[u8]) -> Result<Vec<RawBar>> {
    decode_bars_checked(data, &DecodeContext::default()).map(|decoded| decoded.bars)
}

/// Decodes Dukascopy candle records and repairs inconsistent bars.
///
/// The candle format stores bars as 24 bytes in big-endian order:
/// - `u32`: seconds offset from the start of the GMT day (bytes 0-3)
/// - `u32`: open (bytes 4-7)
/// - `u32`: close (bytes 8-11)
/// - `u32`: low (bytes 12-15)
/// - `u32`: high (bytes 16-19)
/// - `f32`: volume in lots (bytes 20-23)
///
/// A bar whose open or close lies outside `[low, high]` gets its high and low
/// recomputed from all four prices. Each repair is logged as a warning naming
/// the context and the original prices.
///
/// # Errors
///
/// Returns [`HistoryError::MalformedData`] if the buffer is empty or not a
/// multiple of [`RawBar::SIZE`].
pub fn decode_bars_checked(data: &[u8], ctx: &DecodeContext<'_>) -> Result<DecodedBars> {
    if data.is_empty() || !data.len().is_multiple_of(RawBar::SIZE) {
        return Err(HistoryError::MalformedData {
            len: data.len(),
            record_size: RawBar::SIZE,
        });
    }

    let mut repaired = 0;
    let bars = data
        .chunks_exact(RawBar::SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            let mut bar = parse_single_bar(chunk);
            let original = bar;
            if bar.repair() {
                repaired += 1;
                warn!(
                    "Illegal {} {} data for bar[{}] of {}: O={} H={} L={} C={}, adjusting high/low to H={} L={}",
                    ctx.symbol,
                    ctx.price_type,
                    i,
                    ctx.day,
                    ctx.format_points(original.open),
                    ctx.format_points(original.high),
                    ctx.format_points(original.low),
                    ctx.format_points(original.close),
                    ctx.format_points(bar.high),
                    ctx.format_points(bar.low),
                );
            }
            bar
        })
        .collect();

    Ok(DecodedBars { bars, repaired })
}

/// Parses a single candle from a 24-byte chunk.
#[inline]
fn parse_single_bar(data: &[u8]) -> RawBar {
    RawBar::new(
        BigEndian::read_u32(&data[0..4]),
        BigEndian::read_u32(&data[4..8]),
        BigEndian::read_u32(&data[8..12]),
        BigEndian::read_u32(&data[12..16]),
        BigEndian::read_u32(&data[16..20]),
        round2(BigEndian::read_f32(&data[20..24])),
    )
}

/// Decodes Dukascopy tick records.
///
/// The tick format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds offset from the file's reference hour (bytes 0-3)
/// - `u32`: ask price raw (bytes 4-7)
/// - `u32`: bid price raw (bytes 8-11)
/// - `f32`: ask volume (bytes 12-15)
/// - `f32`: bid volume (bytes 16-19)
///
/// # Errors
///
/// Returns [`HistoryError::MalformedData`] if the buffer is empty or not a
/// multiple of [`RawTick::SIZE`].
pub fn decode_ticks(data: &[u8]) -> Result<Vec<RawTick>> {
    if data.is_empty() || !data.len().is_multiple_of(RawTick::SIZE) {
        return Err(HistoryError::MalformedData {
            len: data.len(),
            record_size: RawTick::SIZE,
        });
    }

    Ok(data.chunks_exact(RawTick::SIZE).map(parse_single_tick).collect())
}

/// Parses a single tick from a 20-byte chunk.
#[inline]
fn parse_single_tick(data: &[u8]) -> RawTick {
    RawTick::new(
        BigEndian::read_u32(&data[0..4]),
        BigEndian::read_u32(&data[4..8]),
        BigEndian::read_u32(&data[8..12]),
        round2(BigEndian::read_f32(&data[12..16])),
        round2(BigEndian::read_f32(&data[16..20])),
    )
}

/// Rounds a vendor volume to 2 decimals.
fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_bar_bytes(delta: u32, o: u32, c: u32, l: u32, h: u32, lots: f32) -> Vec<u8> {
        let mut bytes = vec![0u8; 24];
        BigEndian::write_u32(&mut bytes[0..4], delta);
        BigEndian::write_u32(&mut bytes[4..8], o);
        BigEndian::write_u32(&mut bytes[8..12], c);
        BigEndian::write_u32(&mut bytes[12..16], l);
        BigEndian::write_u32(&mut bytes[16..20], h);
        BigEndian::write_f32(&mut bytes[20..24], lots);
        bytes
    }

    fn create_test_tick_bytes(ms: u32, ask: u32, bid: u32, ask_vol: f32, bid_vol: f32) -> Vec<u8> {
        let mut bytes = vec![0u8; 20];
        BigEndian::write_u32(&mut bytes[0..4], ms);
        BigEndian::write_u32(&mut bytes[4..8], ask);
        BigEndian::write_u32(&mut bytes[8..12], bid);
        BigEndian::write_f32(&mut bytes[12..16], ask_vol);
        BigEndian::write_f32(&mut bytes[16..20], bid_vol);
        bytes
    }

    #[test]
    fn test_decode_bars() {
        let mut data = create_test_bar_bytes(0, 112_345, 112_350, 112_340, 112_360, 12.345);
        data.extend(create_test_bar_bytes(60, 112_350, 112_330, 112_320, 112_355, 3.0));

        let bars = decode_bars(&data).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time_delta, 0);
        assert_eq!(bars[0].open, 112_345);
        assert_eq!(bars[0].close, 112_350);
        assert_eq!(bars[0].low, 112_340);
        assert_eq!(bars[0].high, 112_360);
        assert_relative_eq!(bars[0].lots, 12.35, epsilon = 1e-4);
        assert_eq!(bars[1].time_delta, 60);
    }

    #[test]
    fn test_decode_bars_repairs_ohlc() {
        // close above high
        let data = create_test_bar_bytes(0, 100, 130, 90, 120, 1.0);
        let ctx = DecodeContext::new("EURUSD", PriceType::Ask, FxtDay::from_index(19_793), 5);
        let decoded = decode_bars_checked(&data, &ctx).unwrap();

        assert_eq!(decoded.repaired, 1);
        let bar = decoded.bars[0];
        assert_eq!(bar.high, 130);
        assert_eq!(bar.low, 90);
        assert!(bar.low <= bar.open.min(bar.close));
        assert!(bar.high >= bar.open.max(bar.close));
    }

    #[test]
    fn test_decode_bars_invalid_length() {
        let data = vec![0u8; 30];
        assert!(matches!(
            decode_bars(&data),
            Err(HistoryError::MalformedData { len: 30, record_size: 24 })
        ));
        assert!(matches!(
            decode_bars(&[]),
            Err(HistoryError::MalformedData { len: 0, .. })
        ));
    }

    #[test]
    fn test_parse_single_tick() {
        let bytes = create_test_tick_bytes(1000, 112_345, 112_340, 100.0, 200.0);
        let tick = parse_single_tick(&bytes);

        assert_eq!(tick.time_delta, 1000);
        assert_eq!(tick.ask, 112_345);
        assert_eq!(tick.bid, 112_340);
        assert_relative_eq!(tick.ask_size, 100.0);
        assert_relative_eq!(tick.bid_size, 200.0);
    }

    #[test]
    fn test_decode_multiple_ticks() {
        let mut data = create_test_tick_bytes(0, 100, 99, 10.0, 20.0);
        data.extend(create_test_tick_bytes(1000, 101, 100, 15.0, 25.0));

        let ticks = decode_ticks(&data).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].time_delta, 0);
        assert_eq!(ticks[1].time_delta, 1000);
    }

    #[test]
    fn test_decode_ticks_invalid_length() {
        let data = vec![0u8; 25];
        assert!(matches!(
            decode_ticks(&data),
            Err(HistoryError::MalformedData { len: 25, record_size: 20 })
        ));
        assert!(matches!(
            decode_ticks(&[]),
            Err(HistoryError::MalformedData { len: 0, record_size: 20 })
        ));
    }

    #[test]
    fn test_format_points() {
        let ctx = DecodeContext::new("USDJPY", PriceType::Bid, FxtDay::from_index(0), 3);
        assert_eq!(ctx.format_points(151_234), "151.234");
    }
}
