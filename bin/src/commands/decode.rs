//! Decode command implementation.
//!
//! Prints the records of a local Dukascopy file.

use anyhow::{Context, Result};
use chrono::DateTime;
use rosabar_lib::{DecodeContext, decode_bars_checked, decode_ticks, decompress_bi5, is_lzma};
use rosabar_lib::prelude::*;
use std::path::Path;

use crate::display::{format_price, format_time_of_day, parse_date};

/// Digits assumed when no symbol is given.
const DEFAULT_DIGITS: u8 = 5;

/// Decode a candle or tick file and print its records.
///
/// Tick offsets are applied to midnight GMT of `day`.
pub(crate) fn decode(file: &Path, symbol: Option<&str>, day: Option<&str>, ticks: bool) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let data = if is_lzma(&raw) {
        decompress_bi5(&raw).with_context(|| format!("Failed to decompress {}", file.display()))?
    } else {
        raw
    };

    let instrument = symbol.map(|s| InstrumentRegistry::global().require(s)).transpose()?;
    let digits = instrument.map_or(DEFAULT_DIGITS, Instrument::digits);

    let day = day.map(parse_date).transpose()?.map_or(FxtDay::from_index(0), FxtDay::from_date);

    if ticks {
        let reference = DateTime::from_timestamp(day.start(), 0).context("Day out of range")?;
        let point = 10f64.powi(-i32::from(digits));
        let records = decode_ticks(&data)?;
        println!("{:<23} {:>12} {:>12} {:>10} {:>10}", "TIME (GMT)", "ASK", "BID", "ASK SIZE", "BID SIZE");
        for raw in &records {
            let tick = raw.normalize(reference, point);
            println!(
                "{:<23} {:>12.*} {:>12.*} {:>10.2} {:>10.2}",
                tick.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                usize::from(digits),
                tick.ask,
                usize::from(digits),
                tick.bid,
                tick.ask_size,
                tick.bid_size
            );
        }
        println!("\nTotal: {} ticks", records.len());
        return Ok(());
    }

    let name = instrument.map_or("?", Instrument::symbol);
    let ctx = DecodeContext::new(name, PriceType::Bid, day, digits);
    let decoded = decode_bars_checked(&data, &ctx)?;

    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "TIME", "OPEN", "HIGH", "LOW", "CLOSE", "LOTS"
    );
    for bar in &decoded.bars {
        println!(
            "{:<8} {:>12} {:>12} {:>12} {:>12} {:>10.2}",
            format_time_of_day(bar.time_delta),
            format_price(bar.open, digits),
            format_price(bar.high, digits),
            format_price(bar.low, digits),
            format_price(bar.close, digits),
            bar.lots
        );
    }
    println!("\nTotal: {} bars ({} repaired)", decoded.bars.len(), decoded.repaired);
    Ok(())
}
