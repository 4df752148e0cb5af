//! Binary record codecs for the rosabar bar history toolkit.
//!
//! - [`decode_bars`] / [`decode_bars_checked`] - Dukascopy candle records
//! - [`decode_ticks`] - Dukascopy tick records
//! - [`encode_bars`] / [`read_stored_bars`] - The local stored bar format
//! - [`decode_history_starts`] - The Dukascopy history start stream

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod history_start;
mod storage;
mod vendor;

pub use history_start::{HistoryStart, decode_history_start_section, decode_history_starts};
pub use storage::{encode_bars, read_stored_bars, stored_bar_count};
pub use vendor::{DecodeContext, DecodedBars, decode_bars, decode_bars_checked, decode_ticks};
