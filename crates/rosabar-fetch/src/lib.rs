//! Dukascopy transport for rosabar.
//!
//! - [`url`] - Candle and history start URLs
//! - [`DownloadClient`] - HTTP client with connection pooling and retries
//! - [`decompress_bi5`] - LZMA decompression
//! - [`fetch_candles`] - Download and decompress a GMT day's candle file

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod decompress;
mod fetch;
pub mod url;

pub use client::{ClientConfig, DownloadClient, DownloadError};
pub use decompress::{DecompressError, decompress_bi5, is_lzma};
pub use fetch::{decompress, fetch_all_history_starts, fetch_candles, fetch_history_start};
