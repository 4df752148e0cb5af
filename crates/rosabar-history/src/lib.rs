//! Day buffering, bid/ask merging and history storage for rosabar.
//!
//! - [`DayBarBuffer`] - Joins vendor files into complete FXT days
//! - [`merge`] - Bid + ask → average series
//! - [`UpdateRun`] - Per-symbol update state
//! - [`HistoryStore`] / [`atomic_write`] - The local history
//! - [`BoundedCache`] / [`HistoryStartCache`] - Run-owned caches

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod buffer;
mod cache;
mod merge;
mod pipeline;
mod store;

pub use buffer::DayBarBuffer;
pub use cache::{BoundedCache, DEFAULT_CACHE_CAPACITY, HistoryStartCache};
pub use merge::merge;
pub use pipeline::{UpdateConfig, UpdateRun, merge_day, process_vendor_day, save_day};
pub use store::{HistoryStore, atomic_write};
