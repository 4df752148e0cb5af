//! LZMA decompression for bi5 files.

use lzma_rs::lzma_decompress;
use rosabar_types::HistoryError;
use std::io::{BufReader, Cursor};
use thiserror::Error;

/// Errors that can occur during decompression.
#[derive(Error, Debug)]
pub enum DecompressError {
    /// LZMA decompression failed.
    #[error("LZMA decompression failed: {0}")]
    LzmaError(String),

    /// Empty input data.
    #[error("Empty input data")]
    EmptyInput,
}

impl From<DecompressError> for HistoryError {
    fn from(err: DecompressError) -> Self {
        Self::Decompress(err.to_string())
    }
}

/// Decompresses LZMA-compressed bi5 data.
///
/// Dukascopy candle files are LZMA-compressed arrays of 24-byte bar records.
///
/// # Errors
///
/// Returns an error if the input is empty or not valid LZMA data.
pub fn decompress_bi5(compressed: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if compressed.is_empty() {
        return Err(DecompressError::EmptyInput);
    }

    let mut decompressed = Vec::new();
    let mut reader = BufReader::new(Cursor::new(compressed));

    lzma_decompress(&mut reader, &mut decompressed)
        .map_err(|e| DecompressError::LzmaError(e.to_string()))?;

    Ok(decompressed)
}

/// Returns true if the data starts like an LZMA stream (`.lzma` header with
/// the properties byte used by Dukascopy).
#[must_use]
pub fn is_lzma(data: &[u8]) -> bool {
    data.first() == Some(&0x5d)
}
