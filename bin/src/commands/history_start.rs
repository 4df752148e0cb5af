//! History start command implementation.

use anyhow::{Context, Result};
use rosabar_lib::{
    DownloadClient, decode_history_start_section, decode_history_starts, fetch_all_history_starts,
    fetch_history_start,
};

use crate::display::format_fxt;

/// Fetch and print the vendor's history start of a symbol, or of all symbols.
pub(crate) async fn history_start(symbol: Option<&str>) -> Result<()> {
    let client = DownloadClient::with_defaults()?;

    let Some(symbol) = symbol else {
        let data = fetch_all_history_starts(&client)
            .await?
            .context("The vendor published no history start")?;
        let symbols = decode_history_starts(&data).context("Failed to decode history starts")?;

        println!("{:<12} {:<10} {:<19}", "SYMBOL", "TIMEFRAME", "START (FXT)");
        for (symbol, starts) in &symbols {
            for start in starts {
                println!(
                    "{:<12} {:<10} {:<19}",
                    symbol,
                    start.timeframe.to_string(),
                    format_fxt(start.start_seconds())
                );
            }
        }
        println!("\nTotal: {} symbols", symbols.len());
        return Ok(());
    };

    let data = fetch_history_start(&client, symbol)
        .await?
        .with_context(|| format!("No history start published for {}", symbol.to_uppercase()))?;
    let starts = decode_history_start_section(&data, None)
        .with_context(|| format!("Failed to decode history start of {}", symbol.to_uppercase()))?;

    println!("{}", symbol.to_uppercase());
    for start in &starts {
        println!("  {:<10} {}", start.timeframe.to_string(), format_fxt(start.start_seconds()));
    }
    Ok(())
}
