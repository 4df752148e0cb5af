//! Update command implementation.
//!
//! This module drives the per-symbol history update: for every FXT weekday
//! without stored history it loads the vendor files the day needs, merges
//! bid and ask and stores the result.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, TimeDelta, Utc};
use rosabar_lib::prelude::*;
use rosabar_lib::{
    UpdateConfig, atomic_write, decode_history_start_section, decompress, fetch_history_start,
    url::candle_url,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::display::{day_progress, parse_date};
use crate::layout::{Layout, VendorPaths, default_storage};

/// Update the stored history of the given symbols.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn update(
    symbols: &[String],
    start: Option<&str>,
    end: Option<&str>,
    storage: Option<PathBuf>,
    keep_downloads: bool,
    concurrency: usize,
    quiet: bool,
) -> Result<()> {
    let registry = InstrumentRegistry::global();
    let instruments = symbols
        .iter()
        .map(|s| registry.require(s))
        .collect::<rosabar_lib::Result<Vec<_>>>()?;
    if let Some(synthetic) = instruments.iter().find(|i| i.is_synthetic()) {
        bail!(
            "{} is a synthetic instrument, use the synthetic command",
            synthetic.symbol()
        );
    }

    let start = start.map(parse_date).transpose()?;
    let end = match end {
        Some(s) => parse_date(s)?,
        None => (Utc::now() - TimeDelta::days(1)).date_naive(),
    };

    let config = UpdateConfig {
        storage: storage.unwrap_or_else(default_storage),
        keep_downloads,
        ..UpdateConfig::default()
    };
    let client = DownloadClient::new(ClientConfig {
        concurrency,
        ..Default::default()
    })?;
    let mut layout = Layout::new(&config);
    info!(storage = %config.storage.display(), "updating history");

    for instrument in instruments {
        update_symbol(&client, &mut layout, instrument, start, end, quiet)
            .await
            .with_context(|| format!("Failed to update {}", instrument.symbol()))?;
    }
    Ok(())
}

async fn update_symbol(
    client: &DownloadClient,
    layout: &mut Layout,
    instrument: &Instrument,
    start: Option<NaiveDate>,
    end: NaiveDate,
    quiet: bool,
) -> Result<()> {
    let mut run = UpdateRun::new(instrument, Timeframe::Minute1)?;
    let start = match start {
        Some(date) => date,
        None => history_start(client, &mut run, instrument).await?,
    };
    if start > end {
        info!(symbol = instrument.symbol(), "nothing to update");
        return Ok(());
    }

    let range = DateRange::new(start, end)?;
    let progress = day_progress(
        range.total_days() as u64,
        quiet,
        format!("{} {} -> {}", instrument.symbol(), start, end),
    )?;

    let (mut stored, mut missing) = (0usize, 0usize);
    for day in range.days() {
        let exists = layout
            .store()
            .exists(instrument.category(), instrument.symbol(), day, Timeframe::Minute1);
        if instrument.is_trading_day(day) && !exists {
            if update_day(client, layout, &mut run, instrument, day).await? {
                stored += 1;
            } else {
                missing += 1;
            }
        }
        run.finish_day(day);
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "{}: {stored} days stored, {missing} days without vendor data",
        instrument.symbol()
    ));
    Ok(())
}

/// Returns the first day of M1 history, fetching it from the vendor if the
/// registry doesn't know it.
async fn history_start(client: &DownloadClient, run: &mut UpdateRun, instrument: &Instrument) -> Result<NaiveDate> {
    let symbol = instrument.symbol();
    let known = instrument
        .history_start_m1()
        .or_else(|| run.history_starts().m1_start(symbol));

    let start = match known {
        Some(start) => start,
        None => {
            let data = fetch_history_start(client, symbol)
                .await?
                .with_context(|| format!("No history start published for {symbol}"))?;
            let starts = decode_history_start_section(&data, None)?;
            run.history_starts_mut().insert(symbol, starts);
            run.history_starts()
                .m1_start(symbol)
                .with_context(|| format!("No M1 history available for {symbol}"))?
        }
    };
    FxtDay::of(start)
        .date()
        .with_context(|| format!("Invalid history start of {symbol}: {start}"))
}

/// Completes, merges and stores one FXT day.
///
/// Returns false if the vendor has no data for one of the required files.
async fn update_day(
    client: &DownloadClient,
    layout: &mut Layout,
    run: &mut UpdateRun,
    instrument: &Instrument,
    day: FxtDay,
) -> Result<bool> {
    let files = run.required_files(day)?;
    let Some(sources) = load_vendor_files(client, layout, instrument, &files).await? else {
        warn!(symbol = instrument.symbol(), %day, "no vendor data");
        return Ok(false);
    };

    for ((price_type, day_gmt), data) in files.into_iter().zip(sources) {
        run.process_vendor_day(price_type, day_gmt, &data)?;
    }

    let bars = run.merge_day(day)?;
    let data = run.save_day(day, &bars)?;
    let path = layout
        .store()
        .day_file(instrument.category(), instrument.symbol(), day, Timeframe::Minute1);
    atomic_write(&path, &data)?;
    info!(symbol = instrument.symbol(), %day, bars = bars.len(), "stored");
    Ok(true)
}

/// Loads the decompressed vendor files, from disk where kept earlier and
/// from the vendor otherwise.
///
/// Returns `None` if any of the files is not available.
async fn load_vendor_files(
    client: &DownloadClient,
    layout: &mut Layout,
    instrument: &Instrument,
    files: &[(PriceType, FxtDay)],
) -> Result<Option<Vec<Vec<u8>>>> {
    let mut compressed: Vec<Option<Vec<u8>>> = Vec::with_capacity(files.len());
    let mut remote = Vec::new();

    for (i, &(price_type, day_gmt)) in files.iter().enumerate() {
        let paths = layout
            .vendor_paths(instrument, price_type, day_gmt)
            .cloned()
            .with_context(|| format!("{price_type} prices are not published"))?;
        if paths.missing.exists() {
            debug!(path = %paths.missing.display(), "known missing");
            return Ok(None);
        }
        if layout.keep_downloads() && paths.compressed.exists() {
            compressed.push(Some(std::fs::read(&paths.compressed)?));
            continue;
        }
        let date = day_gmt.date().context("Day out of range")?;
        let url = candle_url(instrument.symbol(), price_type, date)
            .with_context(|| format!("{price_type} prices are not published"))?;
        remote.push((i, url, paths));
        compressed.push(None);
    }

    let urls: Vec<&str> = remote.iter().map(|(_, url, _)| url.as_str()).collect();
    let downloads = client.download_all(&urls).await;
    for ((i, url, paths), download) in remote.iter().zip(downloads) {
        let Some(bytes) = download.with_context(|| format!("Failed to download {url}"))? else {
            mark_missing(paths)?;
            return Ok(None);
        };
        if layout.keep_downloads() {
            atomic_write(&paths.compressed, &bytes)?;
        }
        compressed[*i] = Some(bytes.to_vec());
    }

    let mut decompressed = Vec::with_capacity(compressed.len());
    for data in compressed.into_iter().flatten() {
        decompressed.push(decompress(data).await?);
    }
    Ok(Some(decompressed))
}

fn mark_missing(paths: &VendorPaths) -> Result<()> {
    atomic_write(&paths.missing, &[])?;
    debug!(path = %paths.missing.display(), "marked missing");
    Ok(())
}
