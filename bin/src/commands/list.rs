//! List command implementation.
//!
//! This module handles listing known instruments with optional filtering.

use crate::display::{format_fxt, parse_category};
use anyhow::Result;
use rosabar_lib::prelude::*;

/// List known instruments with optional category filter or search pattern.
pub(crate) fn list_instruments(category: Option<&str>, search: Option<&str>) -> Result<()> {
    let registry = InstrumentRegistry::global();

    let mut instruments: Vec<_> = match (category, search) {
        (Some(cat), _) => {
            let category = parse_category(cat)?;
            registry.by_category(category).collect()
        }
        (_, Some(pattern)) => registry.search(pattern),
        (None, None) => registry.all().collect(),
    };
    instruments.sort_by(|a, b| a.symbol().cmp(b.symbol()));

    if instruments.is_empty() {
        println!("No instruments found.");
        return Ok(());
    }

    println!(
        "{:<8} {:<40} {:<10} {:>6}  {:<19}",
        "SYMBOL", "DESCRIPTION", "CATEGORY", "DIGITS", "HISTORY START (FXT)"
    );
    println!("{}", "-".repeat(88));

    for instrument in &instruments {
        let start = instrument
            .history_start_m1()
            .map_or_else(|| "-".to_string(), format_fxt);
        println!(
            "{:<8} {:<40} {:<10} {:>6}  {:<19}",
            instrument.symbol(),
            instrument.description(),
            instrument.category().to_string(),
            instrument.digits(),
            start
        );
    }

    println!("\nTotal: {} instruments", instruments.len());
    Ok(())
}
