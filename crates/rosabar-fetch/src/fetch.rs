//! Download helpers returning decoded-ready buffers.

use chrono::NaiveDate;
use rosabar_types::{HistoryError, PriceType, Result};
use tracing::debug;

use crate::{
    DownloadClient, decompress_bi5,
    url::{all_history_starts_url, candle_url, history_start_url},
};

/// Downloads and decompresses a GMT day's M1 candle file.
///
/// Returns `Ok(None)` if the vendor has no file for the day. Decompression
/// runs on the blocking thread pool.
///
/// # Errors
///
/// Returns [`HistoryError::Http`] if the download fails and
/// [`HistoryError::Decompress`] if the file is not valid LZMA data.
pub async fn fetch_candles(
    client: &DownloadClient,
    symbol: &str,
    price_type: PriceType,
    day: NaiveDate,
) -> Result<Option<Vec<u8>>> {
    let url = candle_url(symbol, price_type, day)
        .ok_or_else(|| HistoryError::Http(format!("{price_type} prices are not published")))?;

    let Some(compressed) = client.download(&url).await? else {
        return Ok(None);
    };
    debug!(url, bytes = compressed.len(), "downloaded");
    decompress(compressed.to_vec()).await.map(Some)
}

/// Decompresses on the blocking thread pool.
///
/// # Errors
///
/// Returns [`HistoryError::Decompress`] if the data is not valid LZMA data.
pub async fn decompress(compressed: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || decompress_bi5(&compressed))
        .await
        .map_err(|e| HistoryError::Decompress(format!("spawn_blocking failed: {e}")))?
        .map_err(HistoryError::from)
}

/// Downloads a symbol's history start section.
///
/// # Errors
///
/// Returns [`HistoryError::Http`] if the download fails.
pub async fn fetch_history_start(client: &DownloadClient, symbol: &str) -> Result<Option<Vec<u8>>> {
    let data = client.download(&history_start_url(symbol)).await?;
    Ok(data.map(|bytes| bytes.to_vec()))
}

/// Downloads the history start stream of all symbols.
///
/// # Errors
///
/// Returns [`HistoryError::Http`] if the download fails.
pub async fn fetch_all_history_starts(client: &DownloadClient) -> Result<Option<Vec<u8>>> {
    let data = client.download(&all_history_starts_url()).await?;
    Ok(data.map(|bytes| bytes.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_avg_candles_rejected() {
        let client = DownloadClient::with_defaults().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let result = fetch_candles(&client, "AUDUSD", PriceType::Avg, day).await;
        assert!(matches!(result, Err(HistoryError::Http(_))));
    }

    #[tokio::test]
    async fn test_decompress_invalid() {
        let result = decompress(vec![1, 2, 3]).await;
        assert!(matches!(result, Err(HistoryError::Decompress(_))));
    }
}
