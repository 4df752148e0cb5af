//! Core types for the rosabar bar history toolkit.
//!
//! This crate provides the fundamental data structures used throughout rosabar:
//!
//! - [`Bar`] - A stored bar with prices in points
//! - [`PriceBar`] - The same bar with floating point prices
//! - [`RawBar`] / [`AlignedBar`] - Vendor bar records before and after time alignment
//! - [`RawTick`] / [`Tick`] - Vendor tick records
//! - [`PriceType`] - Bid, ask or average price series
//! - [`Timeframe`] - Bar period
//! - [`FxtDay`] / [`DateRange`] - Trading days in FXT
//! - [`Instrument`] - Instrument metadata (digits, point size, history start)
//! - [`HistoryError`] - Error taxonomy shared by all crates

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rosasurfer/rosabar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod day;
mod error;
mod instrument;
mod price_type;
mod tick;
mod timeframe;

pub use bar::{AlignedBar, Bar, PriceBar, RawBar};
pub use day::{DateRange, DayIterator, FxtDay, SECONDS_PER_DAY};
pub use error::{DateRangeError, HistoryError, Result};
pub use instrument::{Category, Instrument};
pub use price_type::PriceType;
pub use tick::{RawTick, Tick};
pub use timeframe::{Timeframe, TimeframeParseError};
