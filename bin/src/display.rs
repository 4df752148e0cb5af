//! Display and argument helpers for the rosabar CLI.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use rosabar_lib::prelude::*;

/// Parse a category string into a Category enum.
pub(crate) fn parse_category(s: &str) -> Result<Category> {
    match s.to_lowercase().as_str() {
        "forex" => Ok(Category::Forex),
        "metals" => Ok(Category::Metals),
        "index" => Ok(Category::Index),
        "commodity" => Ok(Category::Commodity),
        "crypto" => Ok(Category::Crypto),
        "synthetic" => Ok(Category::Synthetic),
        _ => bail!(
            "Unknown category: {}. Valid options: forex, metals, index, commodity, crypto, synthetic",
            s
        ),
    }
}

/// Parse a `YYYY-MM-DD` argument.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {s}"))
}

/// Formats an FXT timestamp as wall clock time.
pub(crate) fn format_fxt(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0).map_or_else(
        || timestamp.to_string(),
        |dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Formats seconds since midnight as `HH:MM:SS`.
pub(crate) fn format_time_of_day(seconds: u32) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}

/// Formats a price in points with the given digits.
pub(crate) fn format_price(points: u32, digits: u8) -> String {
    let point = 10f64.powi(-i32::from(digits));
    format!("{:.*}", usize::from(digits), f64::from(points) * point)
}

/// Creates a day progress bar, hidden in quiet mode.
pub(crate) fn day_progress(days: u64, quiet: bool, message: String) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(days);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({percent}%) {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message(message);
    Ok(pb)
}
